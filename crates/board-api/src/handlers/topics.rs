//! Topic handlers

use axum::{extract::State, Json};
use board_service::dto::{CreateTopicRequest, PostResponse, TopicResponse};
use board_service::services::TopicService;

use crate::extractors::{AuthUser, Pagination, SnowflakePath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /topics
pub async fn list_topics(State(state): State<AppState>) -> ApiResult<Json<Vec<TopicResponse>>> {
    let service = TopicService::new(state.service_context());
    Ok(Json(service.list_topics().await?))
}

/// POST /topics
pub async fn create_topic(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateTopicRequest>,
) -> ApiResult<Created<Json<TopicResponse>>> {
    let service = TopicService::new(state.service_context());
    let topic = service.create_topic(auth.user_id, request).await?;
    Ok(Created(Json(topic)))
}

/// GET /topics/{topic_id}
pub async fn get_topic(
    State(state): State<AppState>,
    SnowflakePath(topic_id): SnowflakePath,
) -> ApiResult<Json<TopicResponse>> {
    let service = TopicService::new(state.service_context());
    Ok(Json(service.get_topic(topic_id).await?))
}

/// Delete a topic (creator or admin); posts keep existing without the tag
///
/// DELETE /topics/{topic_id}
pub async fn delete_topic(
    State(state): State<AppState>,
    auth: AuthUser,
    SnowflakePath(topic_id): SnowflakePath,
) -> ApiResult<NoContent> {
    let service = TopicService::new(state.service_context());
    service.delete_topic(topic_id, auth.user_id).await?;
    Ok(NoContent)
}

/// GET /topics/{topic_id}/posts
pub async fn topic_posts(
    State(state): State<AppState>,
    SnowflakePath(topic_id): SnowflakePath,
    pagination: Pagination,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let service = TopicService::new(state.service_context());
    let posts = service
        .list_posts(topic_id, pagination.before, Some(pagination.limit))
        .await?;
    Ok(Json(posts))
}
