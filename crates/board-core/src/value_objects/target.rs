//! Reaction and follow targets

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// Kind of content a reaction is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionTargetKind {
    Post,
    #[serde(alias = "comment")]
    Message,
}

impl ReactionTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ReactionTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity a user can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowTarget {
    User(Snowflake),
    Post(Snowflake),
    Topic(Snowflake),
}

impl FollowTarget {
    pub fn id(&self) -> Snowflake {
        match self {
            Self::User(id) | Self::Post(id) | Self::Topic(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Post(_) => "post",
            Self::Topic(_) => "topic",
        }
    }
}

impl fmt::Display for FollowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Follow relation as seen by one follower
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowState {
    pub following: bool,
    pub follower_count: i64,
}
