//! Route definitions
//!
//! Board routes are mounted under `/api`; health probes live outside it so
//! they bypass rate limiting.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{
    discovery, follows, health, messages, notifications, posts, reactions, topics, users,
};
use crate::state::AppState;

/// Board API routes, without health probes
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(post_routes())
        .merge(message_routes())
        .merge(topic_routes())
        .merge(user_routes())
        .merge(activity_routes())
}

/// Post routes
fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/hot", get(posts::hot_posts))
        .route("/posts/:post_id", get(posts::get_post).delete(posts::delete_post))
        .route("/posts/:post_id/view", post(posts::record_view))
        .route(
            "/posts/:post_id/messages",
            get(posts::list_messages).post(posts::create_message),
        )
        .route(
            "/posts/:post_id/follow",
            get(follows::post_state).post(follows::toggle_post),
        )
}

/// Comment routes
fn message_routes() -> Router<AppState> {
    Router::new().route("/messages/:message_id", delete(messages::delete_message))
}

/// Topic routes
fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/topics", get(topics::list_topics).post(topics::create_topic))
        .route(
            "/topics/:topic_id",
            get(topics::get_topic).delete(topics::delete_topic),
        )
        .route("/topics/:topic_id/posts", get(topics::topic_posts))
        .route(
            "/topics/:topic_id/follow",
            get(follows::topic_state).post(follows::toggle_topic),
        )
}

/// User profile routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id", get(users::get_user))
        .route("/users/:user_id/posts", get(users::user_posts))
        .route("/users/:user_id/replies", get(users::user_replies))
        .route("/users/:user_id/reactions", get(users::user_reactions))
        .route("/users/:user_id/following-users", get(users::following_users))
        .route("/users/:user_id/following", get(users::followed_posts))
        .route("/users/:user_id/followed-topics", get(users::followed_topics))
        .route("/users/:user_id/interactions", get(users::interactions))
        .route(
            "/users/:user_id/follow",
            get(follows::user_state).post(follows::toggle_user),
        )
}

/// Reactions, notifications and the discovery feed
fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/react", post(reactions::toggle_reaction))
        .route("/notifications/count", get(notifications::unread_count))
        .route("/notifications/read", post(notifications::mark_read))
        .route("/discovery", get(discovery::feed))
}
