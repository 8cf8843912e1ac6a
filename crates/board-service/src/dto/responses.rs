//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output, with camelCase
//! keys. Snowflake IDs are serialized as strings for JavaScript compatibility.

use board_core::{FeedReason, ReactionLedger};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Post Responses
// ============================================================================

/// Topic reference embedded in a post
#[derive(Debug, Clone, Serialize)]
pub struct TopicRefResponse {
    pub id: String,
    pub name: String,
}

/// Post with its derived counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Author display name
    pub author: String,
    pub author_id: Option<String>,
    pub author_avatar: Option<String>,
    pub topics: Vec<TopicRefResponse>,
    pub images: Vec<String>,
    pub reactions: ReactionLedger,
    /// Total reaction count
    pub upvotes: i64,
    pub follower_count: i64,
    pub views: i64,
    pub comment_count: i64,
    pub heat: i64,
    pub created_at: DateTime<Utc>,
}

/// View counter after a recorded view
#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub views: i64,
}

// ============================================================================
// Comment Responses
// ============================================================================

/// A single comment ("message")
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author: String,
    pub author_id: Option<String>,
    pub author_avatar: Option<String>,
    pub parent_id: Option<String>,
    pub depth: i32,
    pub reply_to_user_id: Option<String>,
    pub reply_to_name: Option<String>,
    pub reactions: ReactionLedger,
    pub upvotes: i64,
    pub created_at: DateTime<Utc>,
}

/// A comment with its nested replies
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub heat: i64,
    pub descendant_count: i64,
    pub replies: Vec<ThreadResponse>,
}

/// Result of a cascading delete
#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    /// Number of removed comments
    pub removed: u64,
}

// ============================================================================
// Reaction Responses
// ============================================================================

/// Ledger after a toggle
#[derive(Debug, Clone, Serialize)]
pub struct ReactionResponse {
    pub success: bool,
    pub reactions: ReactionLedger,
    pub upvotes: i64,
}

impl ReactionResponse {
    pub fn new(reactions: ReactionLedger) -> Self {
        Self {
            success: true,
            upvotes: reactions.total(),
            reactions,
        }
    }
}

/// Content a user has reacted to (profile "reactions" tab)
#[derive(Debug, Clone, Serialize)]
pub struct UserReactionsResponse {
    pub posts: Vec<PostResponse>,
    pub messages: Vec<CommentResponse>,
}

// ============================================================================
// Follow Responses
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub following: bool,
    pub follower_count: i64,
}

// ============================================================================
// Notification Responses
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Kind of interaction entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Reply,
    Reaction,
}

/// One entry of a user's interactions list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub kind: InteractionKind,
    pub actor_id: Option<String>,
    pub actor_name: String,
    /// `post` or `message`
    pub target_type: &'static str,
    pub target_id: String,
    pub post_id: String,
    /// Reply body or emoji
    pub content: String,
    pub target_excerpt: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Discovery Responses
// ============================================================================

/// One feed item, tagged by content type
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedItemResponse {
    Post { reason: FeedReason, post: PostResponse },
    Reply { reason: FeedReason, reply: CommentResponse },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub items: Vec<FeedItemResponse>,
    pub next_cursor: Option<String>,
}

// ============================================================================
// Topic Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub creator_id: Option<String>,
    pub follower_count: i64,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// User Responses
// ============================================================================

/// Public profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub follower_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health of each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    /// `running`, `stopped` or `disabled`
    pub agent: String,
}

impl ReadinessResponse {
    /// The agent does not gate readiness; only the database does
    pub fn ready(database_healthy: bool, agent: &str) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                agent: agent.to_string(),
            },
        }
    }
}
