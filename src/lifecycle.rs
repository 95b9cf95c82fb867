/*!
 * Verification lifecycle of inventory items.
 *
 * An item is born `pending` and moves exactly once to `approved` or
 * `rejected`. [`apply_transition`] is pure: it validates the request against
 * the current item and returns the updated copy, leaving persistence (and the
 * guard against concurrent verifiers) to `services::inventory`.
 */

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::RuleViolation;
use crate::models::{InventoryItem, ItemStatus};

/// Requested verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct StatusChange {
    pub target: ItemStatus,
    #[serde(default)]
    pub note: Option<String>,
}

impl StatusChange {
    pub fn approve() -> Self {
        Self {
            target: ItemStatus::Approved,
            note: None,
        }
    }

    pub fn reject(note: impl Into<String>) -> Self {
        Self {
            target: ItemStatus::Rejected,
            note: Some(note.into()),
        }
    }
}

/// The user recording the verification.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

/// Next `updated_at`: `now` truncated to microseconds, but never earlier than
/// one microsecond after `previous`.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    let floor = previous.trunc_subsecs(6) + Duration::microseconds(1);
    now.max(floor)
}

pub fn apply_transition(
    item: &InventoryItem,
    change: &StatusChange,
    verifier: Verifier<'_>,
    now: DateTime<Utc>,
) -> Result<InventoryItem, RuleViolation> {
    if change.target == ItemStatus::Pending {
        return Err(RuleViolation::InvalidTargetStatus);
    }
    if !item.is_pending() {
        return Err(RuleViolation::ItemNotPending);
    }

    let rejection_note = match change.target {
        ItemStatus::Rejected => {
            let note = change
                .note
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or(RuleViolation::RejectionNoteRequired)?;
            Some(note.to_string())
        }
        _ => None,
    };

    let mut next = item.clone();
    next.status = change.target;
    next.rejection_note = rejection_note;
    next.verified_by = Some(verifier.id);
    next.verified_by_name = Some(verifier.name.to_string());
    next.updated_at = next_updated_at(item.updated_at, now);
    Ok(next)
}
