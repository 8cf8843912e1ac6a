//! Notification handlers

use axum::{extract::State, Json};
use board_service::dto::UnreadCountResponse;
use board_service::services::NotificationService;

use crate::extractors::AuthUser;
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Replies the caller has not seen yet
///
/// GET /notifications/count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.service_context());
    let count = service.unread_count(auth.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark every interaction as seen
///
/// POST /notifications/read
pub async fn mark_read(State(state): State<AppState>, auth: AuthUser) -> ApiResult<NoContent> {
    let service = NotificationService::new(state.service_context());
    service.mark_read(auth.user_id).await?;
    Ok(NoContent)
}
