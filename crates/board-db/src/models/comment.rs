//! Comment database model

use board_core::entities::ReactionLedger;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for comments table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub post_id: i64,
    pub body: String,
    pub author_id: Option<i64>,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub parent_id: Option<i64>,
    pub depth: i32,
    pub reply_to_id: Option<i64>,
    pub reply_to_name: Option<String>,
    pub reactions: Json<ReactionLedger>,
    pub created_at: DateTime<Utc>,
}
