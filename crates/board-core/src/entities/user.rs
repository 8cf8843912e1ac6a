//! User entity - a board member profile and its follow lists

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{Author, FollowTarget, Snowflake};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse a stored role; unknown values fall back to `User`
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: UserRole,
    /// Interactions newer than this are unread; `None` means never read
    pub last_read_interactions: Option<DateTime<Utc>>,
    pub following_users: Vec<Snowflake>,
    pub followers: Vec<Snowflake>,
    pub followed_posts: Vec<Snowflake>,
    pub followed_topics: Vec<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: Snowflake, name: String) -> Self {
        Self {
            id,
            name,
            avatar: None,
            bio: None,
            role: UserRole::User,
            last_read_interactions: None,
            following_users: Vec::new(),
            followers: Vec::new(),
            followed_posts: Vec::new(),
            followed_topics: Vec::new(),
            created_at: super::now_millis(),
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Author identity for content this user writes
    pub fn as_author(&self) -> Author {
        Author::user(self.id, self.name.clone(), self.avatar.clone())
    }

    /// Whether this user follows the target
    pub fn follows(&self, target: FollowTarget) -> bool {
        match target {
            FollowTarget::User(id) => self.following_users.contains(&id),
            FollowTarget::Post(id) => self.followed_posts.contains(&id),
            FollowTarget::Topic(id) => self.followed_topics.contains(&id),
        }
    }

    /// May this user remove content written by `author`
    pub fn can_moderate(&self, author: &Author) -> bool {
        self.is_admin() || author.is_user(self.id)
    }
}
