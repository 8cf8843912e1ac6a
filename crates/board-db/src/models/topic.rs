//! Topic database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for topics table, with the derived post count
#[derive(Debug, Clone, FromRow)]
pub struct TopicModel {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub creator_id: Option<i64>,
    pub followers: Vec<i64>,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
}
