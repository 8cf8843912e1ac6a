//! Reaction handlers

use axum::{extract::State, Json};
use board_service::dto::{ReactRequest, ReactionResponse};
use board_service::services::ReactionService;

use crate::extractors::{Actor, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Toggle an emoji reaction on a post or comment
///
/// POST /react
pub async fn toggle_reaction(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<ReactRequest>,
) -> ApiResult<Json<ReactionResponse>> {
    let service = ReactionService::new(state.service_context());
    Ok(Json(service.toggle(&actor.key(), request).await?))
}
