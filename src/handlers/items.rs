use crate::{
    auth::AuthUser,
    errors::ServiceError,
    events::ItemChange,
    handlers::common::{created_response, no_content_response, validate_input, PageLimits},
    lifecycle::StatusChange,
    models::{Condition, InventoryItem, ItemKind},
    services::inventory::{InventoryService, ItemPatch, NewItem},
    views::{self, DateRange, ItemFilter, ItemView, ViewKind},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::{convert::Infallible, time::Duration};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// State the item handlers need from the application.
pub trait ItemsHandlerState: Clone + Send + Sync + 'static {
    fn inventory_service(&self) -> &InventoryService;
    fn page_limits(&self) -> PageLimits;
}

impl ItemsHandlerState for AppState {
    fn inventory_service(&self) -> &InventoryService {
        &self.services.inventory
    }

    fn page_limits(&self) -> PageLimits {
        PageLimits::from(&self.config)
    }
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemListQuery {
    /// `mine`, `pending` or `all`; defaults per role
    pub view: Option<ViewKind>,
    /// Comma separated statuses, e.g. `pending,rejected`
    pub status: Option<String>,
    pub kind: Option<ItemKind>,
    pub condition: Option<Condition>,
    #[validate(length(max = 100))]
    pub search: Option<String>,
    pub category: Option<String>,
    pub range: Option<DateRange>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ItemListQuery {
    pub fn filter(&self) -> Result<ItemFilter, ServiceError> {
        Ok(ItemFilter {
            statuses: match self.status.as_deref() {
                Some(raw) => views::parse_statuses(raw)?,
                None => Vec::new(),
            },
            kind: self.kind,
            condition: self.condition,
            search: self.search.clone(),
            category: self.category.clone(),
            range: self.range.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    pub view: Option<ViewKind>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Reason shown to the submitter; must not be blank
    #[schema(example = "Segel rusak")]
    pub note: String,
}

/// List items visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemListQuery),
    responses(
        (status = 200, description = "Items returned", body = ApiResponse<PaginatedResponse<InventoryItem>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "View not allowed for this role", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn list_items<S>(
    State(state): State<S>,
    user: AuthUser,
    Query(query): Query<ItemListQuery>,
) -> ApiResult<PaginatedResponse<InventoryItem>>
where
    S: ItemsHandlerState,
{
    validate_input(&query)?;
    let view = ItemView::resolve(query.view, user.user_id, user.role)?;
    let filter = query.filter()?;
    let (page, limit) = state.page_limits().resolve(query.page, query.limit);

    let result = state
        .inventory_service()
        .list(view, &filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.items,
        result.total,
        result.page,
        result.limit,
    ))))
}

/// Submit a new item for verification
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = NewItem,
    responses(
        (status = 201, description = "Item submitted", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Invalid item", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn create_item<S>(
    State(state): State<S>,
    user: AuthUser,
    Json(payload): Json<NewItem>,
) -> Result<(StatusCode, Json<ApiResponse<InventoryItem>>), ServiceError>
where
    S: ItemsHandlerState,
{
    let item = state.inventory_service().create(&user, payload).await?;
    Ok(created_response(item))
}

/// Get one item
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item returned", body = ApiResponse<InventoryItem>),
        (status = 403, description = "Item belongs to another user", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn get_item<S>(
    State(state): State<S>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<InventoryItem>
where
    S: ItemsHandlerState,
{
    let item = state.inventory_service().get(id, &user).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Edit quantity, location or images of an item
#[utoipa::path(
    patch,
    path = "/api/v1/items/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Invalid edit", body = crate::errors::ErrorResponse),
        (status = 403, description = "Item is not editable by the caller", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn update_item<S>(
    State(state): State<S>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<InventoryItem>
where
    S: ItemsHandlerState,
{
    let item = state.inventory_service().update(id, &user, patch).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Approve a pending item
#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/approve",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item approved", body = ApiResponse<InventoryItem>),
        (status = 403, description = "Caller cannot verify", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item is no longer pending", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn approve_item<S>(
    State(state): State<S>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<InventoryItem>
where
    S: ItemsHandlerState,
{
    let item = state
        .inventory_service()
        .update_status(id, StatusChange::approve(), &user)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Reject a pending item with a note
#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/reject",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Item rejected", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Rejection note missing", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller cannot verify", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Item is no longer pending", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn reject_item<S>(
    State(state): State<S>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> ApiResult<InventoryItem>
where
    S: ItemsHandlerState,
{
    let item = state
        .inventory_service()
        .update_status(id, StatusChange::reject(payload.note), &user)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Delete an item permanently
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn delete_item<S>(
    State(state): State<S>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError>
where
    S: ItemsHandlerState,
{
    state.inventory_service().delete(id, &user).await?;
    Ok(no_content_response())
}

/// Live item changes as server-sent events, scoped like the list view.
///
/// Each event is named after the change (`created`, `updated`,
/// `status_changed`, `deleted`). A `resync` event tells the client it fell
/// behind and should reload the list.
#[utoipa::path(
    get,
    path = "/api/v1/items/stream",
    params(StreamQuery),
    responses(
        (status = 200, description = "Event stream (text/event-stream)"),
        (status = 403, description = "View not allowed for this role", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn stream_items<S>(
    State(state): State<S>,
    user: AuthUser,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ServiceError>
where
    S: ItemsHandlerState,
{
    let view = ItemView::resolve(query.view, user.user_id, user.role)?;
    let receiver = state.inventory_service().feed().subscribe();
    debug!(user_id = %user.user_id, ?view, "Change feed subscriber attached");

    Ok(Sse::new(change_stream(receiver, view, user))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn change_stream(
    receiver: broadcast::Receiver<ItemChange>,
    view: ItemView,
    viewer: AuthUser,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    stream::unfold(receiver, move |mut receiver| {
        let viewer = viewer.clone();
        async move {
            loop {
                match receiver.recv().await {
                    Ok(change) => {
                        if !change.visible_in(&view, viewer.user_id, viewer.role) {
                            continue;
                        }
                        match SseEvent::default()
                            .event(change.change.as_str())
                            .json_data(&change)
                        {
                            Ok(event) => return Some((Ok(event), receiver)),
                            Err(err) => {
                                warn!(error = %err, "Dropping unserializable change event");
                                continue;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Change feed subscriber lagged");
                        let event = SseEvent::default().event("resync").data(skipped.to_string());
                        return Some((Ok(event), receiver));
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ChangeFeed, ChangeKind};
    use crate::models::{item::fixtures, ItemStatus, UserRole};
    use futures::StreamExt;

    fn viewer(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            name: "Sari".into(),
            email: "sari@pln.co.id".into(),
            role,
            permissions: Vec::new(),
            token_id: "test-token".into(),
        }
    }

    #[test]
    fn list_query_builds_filter() {
        let query = ItemListQuery {
            status: Some("pending,approved".into()),
            range: Some(DateRange::Week),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.statuses, vec![ItemStatus::Pending, ItemStatus::Approved]);
        assert_eq!(filter.range, DateRange::Week);

        let bad = ItemListQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(bad.filter().is_err());
    }

    #[tokio::test]
    async fn stream_forwards_only_changes_in_view() {
        let feed = ChangeFeed::new(8);
        let staff = viewer(UserRole::Staff);
        let mut events = Box::pin(change_stream(
            feed.subscribe(),
            ItemView::Mine(staff.user_id),
            staff.clone(),
        ));

        let other = fixtures::item(
            Uuid::new_v4(),
            ItemStatus::Pending,
            fixtures::material("Fuse", None, 2),
        );
        let own = fixtures::item(
            staff.user_id,
            ItemStatus::Pending,
            fixtures::material("MCB", None, 2),
        );
        feed.publish(ItemChange::new(ChangeKind::Created, other));
        feed.publish(ItemChange::new(ChangeKind::Created, own));
        drop(feed);

        assert!(events.next().await.is_some());
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn lagging_subscriber_gets_resync() {
        let feed = ChangeFeed::new(1);
        let admin = viewer(UserRole::AdminGudang);
        let mut events = Box::pin(change_stream(feed.subscribe(), ItemView::All, admin));

        for _ in 0..3 {
            feed.publish(ItemChange::new(
                ChangeKind::Created,
                fixtures::item(
                    Uuid::new_v4(),
                    ItemStatus::Pending,
                    fixtures::material("Klem", None, 1),
                ),
            ));
        }
        drop(feed);

        // resync first, then the one change still buffered
        assert!(events.next().await.is_some());
        assert!(events.next().await.is_some());
        assert!(events.next().await.is_none());
    }
}
