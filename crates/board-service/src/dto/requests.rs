//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and `Validate`; query strings only
//! `Deserialize`. Identity fields never appear here: authors and actors are
//! resolved from the bearer token or the caller's address.

use board_core::{ReactionTargetKind, Snowflake};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Post Requests
// ============================================================================

/// Create post request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,

    #[serde(alias = "body")]
    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,

    /// Topic ids; at most three are accepted
    #[serde(default)]
    pub topics: Vec<Snowflake>,

    /// Image URLs produced by the upload collaborator
    #[serde(default)]
    #[validate(length(max = 9, message = "At most 9 images per post"))]
    pub images: Vec<String>,

    /// Display name for anonymous authors; ignored when signed in
    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    pub author_name: Option<String>,
}

// ============================================================================
// Comment Requests
// ============================================================================

/// Create comment ("message") request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(alias = "body")]
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    /// Comment being replied to; absent for a top-level comment
    pub parent_id: Option<Snowflake>,

    /// Display name for anonymous authors; ignored when signed in
    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    pub author_name: Option<String>,
}

/// Thread listing query (`?sort=&author=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadQuery {
    pub sort: Option<String>,
    pub author: Option<String>,
}

// ============================================================================
// Reaction Requests
// ============================================================================

/// Toggle reaction request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReactRequest {
    pub target_id: Snowflake,

    #[serde(alias = "type")]
    pub target_type: ReactionTargetKind,

    #[validate(length(min = 1, message = "Emoji is required"))]
    pub emoji: String,
}

// ============================================================================
// Topic Requests
// ============================================================================

/// Create topic request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    #[validate(length(min = 1, max = 64, message = "Topic name must be 1-64 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    /// Emoji or image URL
    pub icon: Option<String>,
}

// ============================================================================
// Listing Queries
// ============================================================================

/// Discovery feed query (`?cursor=&limit=`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}
