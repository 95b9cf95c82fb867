use crate::{
    auth::{normalize_email, password, user, UserProfile},
    db::DbPool,
    errors::{RuleViolation, ServiceError},
    events::{Event, EventSender},
    models::UserRole,
};
use chrono::{SubsecRound, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    #[schema(example = "staff@pln.co.id")]
    pub email: String,
    #[schema(example = "Budi Santoso")]
    pub name: String,
    pub password: String,
    /// Defaults to `staff`
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

pub fn check_password(password: &str) -> Result<(), RuleViolation> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RuleViolation::WeakPassword);
    }
    Ok(())
}

/// Validates a new account and normalizes its email and name.
pub fn check_new_user(input: &NewUser) -> Result<(String, String), RuleViolation> {
    let email = normalize_email(&input.email);
    if !validator::validate_email(email.as_str()) {
        return Err(RuleViolation::InvalidEmail);
    }
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(RuleViolation::NameRequired);
    }
    check_password(&input.password)?;
    Ok((email, name))
}

/// Account administration
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// All accounts, newest first
    pub async fn list(&self) -> Result<Vec<UserProfile>, ServiceError> {
        let rows = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }

    pub async fn count_active(&self) -> Result<u64, ServiceError> {
        use sea_orm::PaginatorTrait;
        Ok(user::Entity::find()
            .filter(user::Column::Active.eq(true))
            .count(&*self.db_pool)
            .await?)
    }

    async fn find_model(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    pub async fn get(&self, id: Uuid) -> Result<UserProfile, ServiceError> {
        Ok(self.find_model(id).await?.into())
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: NewUser) -> Result<UserProfile, ServiceError> {
        let (email, name) = check_new_user(&input)?;

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&*self.db_pool)
            .await?
            .is_some();
        if taken {
            return Err(RuleViolation::EmailTaken.into());
        }

        let now = Utc::now().trunc_subsecs(6);
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(email),
            password_hash: Set(password::hash_password(&input.password)?),
            role: Set(input.role.unwrap_or_default()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(user_id = %model.id, role = %model.role, "User created");
        self.event_sender
            .send_or_log(Event::UserCreated(model.id))
            .await;
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<UserProfile, ServiceError> {
        let existing = self.find_model(id).await?;
        let mut active: user::ActiveModel = existing.into();

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(RuleViolation::NameRequired.into());
            }
            active.name = Set(name);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        active.updated_at = Set(Utc::now().trunc_subsecs(6));

        let model = active.update(&*self.db_pool).await?;
        self.event_sender.send_or_log(Event::UserUpdated(id)).await;
        Ok(model.into())
    }

    /// Activates or deactivates an account. Nobody can deactivate themselves.
    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        id: Uuid,
        active_flag: bool,
        actor_id: Uuid,
    ) -> Result<UserProfile, ServiceError> {
        if id == actor_id && !active_flag {
            return Err(RuleViolation::SelfDeactivation.into());
        }
        let mut active: user::ActiveModel = self.find_model(id).await?.into();
        active.active = Set(active_flag);
        active.updated_at = Set(Utc::now().trunc_subsecs(6));
        let model = active.update(&*self.db_pool).await?;

        info!(user_id = %id, active = active_flag, "User activation changed");
        self.event_sender
            .send_or_log(Event::UserActivationChanged {
                user_id: id,
                active: active_flag,
            })
            .await;
        Ok(model.into())
    }

    #[instrument(skip(self, new_password))]
    pub async fn reset_password(&self, id: Uuid, new_password: &str) -> Result<(), ServiceError> {
        check_password(new_password)?;
        let mut active: user::ActiveModel = self.find_model(id).await?.into();
        active.password_hash = Set(password::hash_password(new_password)?);
        active.updated_at = Set(Utc::now().trunc_subsecs(6));
        active.update(&*self.db_pool).await?;

        self.event_sender
            .send_or_log(Event::UserPasswordReset(id))
            .await;
        Ok(())
    }

    /// Creates the configured administrator unless an account with that email
    /// already exists. Returns whether an account was created.
    #[instrument(skip(self, password))]
    pub async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<bool, ServiceError> {
        let exists = user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&*self.db_pool)
            .await?
            .is_some();
        if exists {
            return Ok(false);
        }

        self.create(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            role: Some(UserRole::AdminGudang),
        })
        .await?;
        info!(%email, "Bootstrap administrator created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn new_user(email: &str, name: &str, password: &str) -> NewUser {
        NewUser {
            email: email.into(),
            name: name.into(),
            password: password.into(),
            role: None,
        }
    }

    #[rstest]
    #[case("bukan-email", "Budi", "rahasia", RuleViolation::InvalidEmail)]
    #[case("budi@pln.co.id", "  ", "rahasia", RuleViolation::NameRequired)]
    #[case("budi@pln.co.id", "Budi", "12345", RuleViolation::WeakPassword)]
    fn invalid_accounts_are_refused(
        #[case] email: &str,
        #[case] name: &str,
        #[case] password: &str,
        #[case] expected: RuleViolation,
    ) {
        assert_eq!(check_new_user(&new_user(email, name, password)), Err(expected));
    }

    #[test]
    fn email_is_normalized() {
        let (email, name) =
            check_new_user(&new_user(" Budi@PLN.co.id ", " Budi ", "123456")).unwrap();
        assert_eq!(email, "budi@pln.co.id");
        assert_eq!(name, "Budi");
        assert_matches!(check_password("123456"), Ok(()));
    }
}
