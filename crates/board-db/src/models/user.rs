//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub last_read_interactions: Option<DateTime<Utc>>,
    pub following_users: Vec<i64>,
    pub followers: Vec<i64>,
    pub followed_posts: Vec<i64>,
    pub followed_topics: Vec<i64>,
    pub created_at: DateTime<Utc>,
}
