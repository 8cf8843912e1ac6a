//! Test fixtures and data generators
//!
//! Provides reusable request bodies and typed views of API responses.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Create post request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub topics: Vec<String>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl CreatePostRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            title: format!("Test post {suffix}"),
            content: "Body of a test post".to_string(),
            topics: vec![],
            images: vec![],
            author_name: None,
        }
    }

    pub fn in_topics(topics: &[&str]) -> Self {
        Self {
            topics: topics.iter().map(|t| (*t).to_string()).collect(),
            ..Self::unique()
        }
    }

    pub fn anonymous(name: &str) -> Self {
        Self {
            author_name: Some(name.to_string()),
            ..Self::unique()
        }
    }
}

/// Create comment request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl CreateMessageRequest {
    pub fn root(content: &str) -> Self {
        Self {
            content: content.to_string(),
            parent_id: None,
            author_name: None,
        }
    }

    pub fn reply(parent_id: &str, content: &str) -> Self {
        Self {
            parent_id: Some(parent_id.to_string()),
            ..Self::root(content)
        }
    }
}

/// Toggle reaction request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactRequest {
    pub target_id: String,
    pub target_type: String,
    pub emoji: String,
}

impl ReactRequest {
    pub fn post(post_id: &str, emoji: &str) -> Self {
        Self {
            target_id: post_id.to_string(),
            target_type: "post".to_string(),
            emoji: emoji.to_string(),
        }
    }

    pub fn message(message_id: &str, emoji: &str) -> Self {
        Self {
            target_id: message_id.to_string(),
            target_type: "message".to_string(),
            emoji: emoji.to_string(),
        }
    }
}

/// Create topic request
#[derive(Debug, Serialize)]
pub struct CreateTopicRequest {
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
}

impl CreateTopicRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            name: format!("topic-{suffix}-{}", std::process::id()),
            description: "A test topic".to_string(),
            icon: Some("🦀".to_string()),
        }
    }
}

/// Emoji -> actor keys
pub type Ledger = BTreeMap<String, Vec<String>>;

/// Topic reference embedded in a post
#[derive(Debug, Deserialize)]
pub struct TopicRef {
    pub id: String,
    pub name: String,
}

/// Post response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub author: String,
    pub author_id: Option<String>,
    pub topics: Vec<TopicRef>,
    pub reactions: Ledger,
    pub upvotes: i64,
    pub follower_count: i64,
    pub views: i64,
    pub comment_count: i64,
    pub heat: i64,
}

/// Single comment response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author: String,
    pub author_id: Option<String>,
    pub parent_id: Option<String>,
    pub depth: i32,
    pub reply_to_user_id: Option<String>,
    pub reply_to_name: Option<String>,
    pub upvotes: i64,
}

/// Comment with nested replies
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    #[serde(flatten)]
    pub message: MessageResponse,
    pub heat: i64,
    pub descendant_count: i64,
    pub replies: Vec<ThreadResponse>,
}

/// View counter
#[derive(Debug, Deserialize)]
pub struct ViewResponse {
    pub views: i64,
}

/// Cascading delete result
#[derive(Debug, Deserialize)]
pub struct DeletedResponse {
    pub removed: u64,
}

/// Reaction toggle result
#[derive(Debug, Deserialize)]
pub struct ReactionResponse {
    pub success: bool,
    pub reactions: Ledger,
    pub upvotes: i64,
}

/// Follow state
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub following: bool,
    pub follower_count: i64,
}

/// Unread interaction count
#[derive(Debug, Deserialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Interaction entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub kind: String,
    pub actor_name: String,
    pub target_id: String,
    pub post_id: String,
    pub content: String,
}

/// Discovery feed page; items stay untyped since they are tagged unions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub items: Vec<serde_json::Value>,
    pub next_cursor: Option<String>,
}

/// Topic response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicResponse {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub creator_id: Option<String>,
    pub follower_count: i64,
    pub post_count: i64,
}

/// Public profile
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub follower_count: i64,
    pub following_count: i64,
}

/// Error response body
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
