use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::notification_dto::{NotificationListResponse, NotificationQuery},
    error::Result,
    middleware::auth::RequestContext,
    AppState,
};

#[utoipa::path(
    get,
    path = "/notifications",
    params(("unread_only" = Option<bool>, Query, description = "Only unread notifications")),
    responses(
        (status = 200, description = "Notifications, newest first", body = NotificationListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse> {
    let (notifications, unread) = state
        .notification_service
        .list(ctx.user.id, query.unread_only)
        .await?;
    Ok(Json(NotificationListResponse {
        unread,
        notifications,
    }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(
        state
            .notification_service
            .mark_read(ctx.user.id, notification_id)
            .await?,
    ))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse> {
    let updated = state.notification_service.mark_all_read(ctx.user.id).await?;
    Ok(Json(json!({ "message": "All notifications marked as read", "updated": updated })))
}
