//! Follow handlers
//!
//! Users, posts and topics share one toggle and one state endpoint shape.

use axum::{extract::State, Json};
use board_core::FollowTarget;
use board_service::dto::FollowResponse;
use board_service::services::FollowService;

use crate::extractors::{AuthUser, SnowflakePath};
use crate::response::ApiResult;
use crate::state::AppState;

async fn toggle(state: &AppState, auth: AuthUser, target: FollowTarget) -> ApiResult<Json<FollowResponse>> {
    let service = FollowService::new(state.service_context());
    Ok(Json(service.toggle(auth.user_id, target).await?))
}

async fn state_of(state: &AppState, auth: AuthUser, target: FollowTarget) -> ApiResult<Json<FollowResponse>> {
    let service = FollowService::new(state.service_context());
    Ok(Json(service.state(auth.user_id, target).await?))
}

/// POST /users/{user_id}/follow
pub async fn toggle_user(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<FollowResponse>> {
    toggle(&state, auth, FollowTarget::User(user_id)).await
}

/// GET /users/{user_id}/follow
pub async fn user_state(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<FollowResponse>> {
    state_of(&state, auth, FollowTarget::User(user_id)).await
}

/// POST /posts/{post_id}/follow
pub async fn toggle_post(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(post_id): SnowflakePath,
) -> ApiResult<Json<FollowResponse>> {
    toggle(&state, auth, FollowTarget::Post(post_id)).await
}

/// GET /posts/{post_id}/follow
pub async fn post_state(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(post_id): SnowflakePath,
) -> ApiResult<Json<FollowResponse>> {
    state_of(&state, auth, FollowTarget::Post(post_id)).await
}

/// POST /topics/{topic_id}/follow
pub async fn toggle_topic(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(topic_id): SnowflakePath,
) -> ApiResult<Json<FollowResponse>> {
    toggle(&state, auth, FollowTarget::Topic(topic_id)).await
}

/// GET /topics/{topic_id}/follow
pub async fn topic_state(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(topic_id): SnowflakePath,
) -> ApiResult<Json<FollowResponse>> {
    state_of(&state, auth, FollowTarget::Topic(topic_id)).await
}
