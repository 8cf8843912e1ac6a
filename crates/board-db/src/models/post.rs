//! Post database model

use board_core::entities::{ReactionLedger, TopicRef};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for posts table, with the derived comment count
#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author_id: Option<i64>,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub topics: Json<Vec<TopicRef>>,
    pub images: Vec<String>,
    pub reactions: Json<ReactionLedger>,
    pub followers: Vec<i64>,
    pub views: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}
