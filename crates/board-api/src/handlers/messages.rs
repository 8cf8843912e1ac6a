//! Comment ("message") handlers

use axum::{extract::State, Json};
use board_service::dto::DeletedResponse;
use board_service::services::CommentService;

use crate::extractors::{AuthUser, SnowflakePath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Delete a comment and every reply below it (author or admin)
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(message_id): SnowflakePath,
) -> ApiResult<Json<DeletedResponse>> {
    let service = CommentService::new(state.service_context());
    let removed = service.delete_comment(message_id, auth.user_id).await?;
    Ok(Json(DeletedResponse { removed }))
}
