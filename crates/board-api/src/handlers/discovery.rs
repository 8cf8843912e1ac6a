//! Discovery feed handler

use axum::{extract::{Query, State}, Json};
use board_service::dto::{FeedQuery, FeedResponse};
use board_service::services::DiscoveryService;

use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// Posts and replies from everything the caller follows
///
/// GET /discovery?cursor=&limit=
pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<FeedResponse>> {
    let service = DiscoveryService::new(state.service_context());
    let page = service
        .compose_feed(auth.user_id, query.cursor.as_deref(), query.limit)
        .await?;
    Ok(Json(page))
}
