//! User profile handlers
//!
//! Profiles are created by the sign-in collaborator; the board only reads
//! them and the activity attached to them.

use axum::{extract::State, Json};
use board_service::dto::{
    CommentResponse, InteractionResponse, PostResponse, TopicResponse, UserReactionsResponse,
    UserResponse,
};
use board_service::services::{
    CommentService, FollowService, NotificationService, PostService, ReactionService, UserService,
};

use crate::extractors::{AuthUser, Pagination, SnowflakePath};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.get_user(user_id).await?))
}

/// GET /users/{user_id}/posts
pub async fn user_posts(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath,
    pagination: Pagination,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let service = PostService::new(state.service_context());
    Ok(Json(service.list_by_author(user_id, Some(pagination.limit)).await?))
}

/// GET /users/{user_id}/replies
pub async fn user_replies(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let service = CommentService::new(state.service_context());
    Ok(Json(service.list_user_replies(user_id).await?))
}

/// GET /users/{user_id}/reactions
pub async fn user_reactions(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<UserReactionsResponse>> {
    let service = ReactionService::new(state.service_context());
    Ok(Json(service.list_user_reactions(user_id).await?))
}

/// GET /users/{user_id}/following-users
pub async fn following_users(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let service = FollowService::new(state.service_context());
    Ok(Json(service.following_users(user_id).await?))
}

/// Posts the user follows
///
/// GET /users/{user_id}/following
pub async fn followed_posts(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let service = FollowService::new(state.service_context());
    Ok(Json(service.followed_posts(user_id).await?))
}

/// GET /users/{user_id}/followed-topics
pub async fn followed_topics(
    State(state): State<AppState>,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<Vec<TopicResponse>>> {
    let service = FollowService::new(state.service_context());
    Ok(Json(service.followed_topics(user_id).await?))
}

/// Replies and reactions on the user's content; only the user may look
///
/// GET /users/{user_id}/interactions
pub async fn interactions(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(user_id): SnowflakePath,
) -> ApiResult<Json<Vec<InteractionResponse>>> {
    let service = NotificationService::new(state.service_context());
    Ok(Json(service.list_interactions(auth.user_id, user_id).await?))
}
