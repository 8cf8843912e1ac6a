//! Topic entity - a named category posts can be tagged with

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Icon used when a topic is created without one
pub const DEFAULT_TOPIC_ICON: &str = "💬";

/// Topic entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: Snowflake,
    /// Unique name
    pub name: String,
    pub description: String,
    /// Emoji or image URL
    pub icon: String,
    pub creator_id: Option<Snowflake>,
    pub followers: Vec<Snowflake>,
    /// Number of posts tagged with this topic, loaded with the topic
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(
        id: Snowflake,
        name: String,
        description: String,
        icon: Option<String>,
        creator_id: Option<Snowflake>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            icon: icon
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOPIC_ICON.to_string()),
            creator_id,
            followers: Vec::new(),
            post_count: 0,
            created_at: super::now_millis(),
        }
    }

    #[inline]
    pub fn follower_count(&self) -> i64 {
        self.followers.len() as i64
    }
}
