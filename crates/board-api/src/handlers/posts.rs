//! Post handlers
//!
//! Endpoints for posts and their comment threads.

use axum::{extract::{Query, State}, Json};
use board_service::dto::{
    CommentResponse, CreateCommentRequest, CreatePostRequest, PostResponse, ThreadQuery,
    ThreadResponse, ViewResponse,
};
use board_service::services::{CommentService, PostService, UserService};

use crate::extractors::{AuthUser, OptionalAuthUser, Pagination, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List posts, newest first
///
/// GET /posts
pub async fn list_posts(
    State(state): State<AppState>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let service = PostService::new(state.service_context());
    let posts = service
        .list_recent(pagination.before, Some(pagination.limit))
        .await?;
    Ok(Json(posts))
}

/// Posts with the most engagement
///
/// GET /posts/hot
pub async fn hot_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostResponse>>> {
    let service = PostService::new(state.service_context());
    Ok(Json(service.list_hot().await?))
}

/// Create post; anonymous callers may supply a display name
///
/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> ApiResult<Created<Json<PostResponse>>> {
    let ctx = state.service_context();
    let author = UserService::new(ctx)
        .resolve_author(auth.user_id(), request.author_name.as_deref())
        .await?;

    let response = PostService::new(ctx).create_post(author, request).await?;
    Ok(Created(Json(response)))
}

/// Get post by ID
///
/// GET /posts/{post_id}
pub async fn get_post(
    State(state): State<AppState>,
    SnowflakePath(post_id): SnowflakePath,
) -> ApiResult<Json<PostResponse>> {
    let service = PostService::new(state.service_context());
    Ok(Json(service.get_post(post_id).await?))
}

/// Count a view
///
/// POST /posts/{post_id}/view
pub async fn record_view(
    State(state): State<AppState>,
    SnowflakePath(post_id): SnowflakePath,
) -> ApiResult<Json<ViewResponse>> {
    let service = PostService::new(state.service_context());
    let views = service.record_view(post_id).await?;
    Ok(Json(ViewResponse { views }))
}

/// Delete post and its comments (author or admin)
///
/// DELETE /posts/{post_id}
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(post_id): SnowflakePath,
) -> ApiResult<NoContent> {
    let service = PostService::new(state.service_context());
    service.delete_post(post_id, auth.user_id).await?;
    Ok(NoContent)
}

/// Comment threads of a post
///
/// GET /posts/{post_id}/messages?sort=&author=
pub async fn list_messages(
    State(state): State<AppState>,
    SnowflakePath(post_id): SnowflakePath,
    Query(query): Query<ThreadQuery>,
) -> ApiResult<Json<Vec<ThreadResponse>>> {
    let service = CommentService::new(state.service_context());
    let threads = service
        .list_threaded(post_id, query.sort.as_deref(), query.author.as_deref())
        .await?;
    Ok(Json(threads))
}

/// Comment on a post, optionally replying to another comment
///
/// POST /posts/{post_id}/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    SnowflakePath(post_id): SnowflakePath,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<Created<Json<CommentResponse>>> {
    let ctx = state.service_context();
    let author = UserService::new(ctx)
        .resolve_author(auth.user_id(), request.author_name.as_deref())
        .await?;

    let response = CommentService::new(ctx)
        .create_comment(post_id, author, request)
        .await?;
    Ok(Created(Json(response)))
}
