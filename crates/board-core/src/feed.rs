//! Discovery feed - cursor handling and multi-source merge
//!
//! The feed is assembled from three independently queried streams (posts by
//! followed users, top-level comments by followed users or on followed posts,
//! posts in followed topics). Each stream is already bounded by the cursor and
//! the page size; [`merge_feed`] dedups, orders and cuts the union.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Comment, Post};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Page size used when the caller gives none
pub const DEFAULT_FEED_LIMIT: i64 = 20;
/// Largest accepted page size
pub const MAX_FEED_LIMIT: i64 = 50;

/// Clamp a requested page size into `1..=MAX_FEED_LIMIT`
pub fn clamp_feed_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT)
}

/// Why an item appears in a user's feed
///
/// Declaration order is priority order: when one item arrives from several
/// streams, the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedReason {
    FollowingUser,
    FollowedPost,
    FollowingTopic,
}

impl FeedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FollowingUser => "following_user",
            Self::FollowedPost => "followed_post",
            Self::FollowingTopic => "following_topic",
        }
    }
}

/// Feed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedContent {
    Post(Post),
    Reply(Comment),
}

impl FeedContent {
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Post(p) => p.id,
            Self::Reply(c) => c.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Post(p) => p.created_at,
            Self::Reply(c) => c.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub content: FeedContent,
    pub reason: FeedReason,
}

impl FeedEntry {
    pub fn new(content: FeedContent, reason: FeedReason) -> Self {
        Self { content, reason }
    }

    fn sort_key(&self) -> (DateTime<Utc>, Snowflake) {
        (self.content.created_at(), self.content.id())
    }
}

/// Exclusive upper bound of the next page
///
/// Rendered as `<unix-millis>:<id>`. A bare timestamp (unix millis or
/// RFC 3339) is accepted on input and bounds by time alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub id: Option<Snowflake>,
}

impl FeedCursor {
    pub fn after(entry: &FeedEntry) -> Self {
        Self {
            created_at: entry.content.created_at(),
            id: Some(entry.content.id()),
        }
    }

    /// Whether an item with this position falls strictly after the cursor
    /// in feed order (i.e. is older)
    pub fn admits(&self, created_at: DateTime<Utc>, id: Snowflake) -> bool {
        match self.id {
            Some(cursor_id) => (created_at, id) < (self.created_at, cursor_id),
            None => created_at < self.created_at,
        }
    }

    /// Id bound for SQL tie-breaking; without an id every tie is excluded
    pub fn id_bound(&self) -> i64 {
        self.id.map_or(i64::MIN, Snowflake::into_inner)
    }
}

impl fmt::Display for FeedCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}:{}", self.created_at.timestamp_millis(), id),
            None => write!(f, "{}", self.created_at.timestamp_millis()),
        }
    }
}

impl FromStr for FeedCursor {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DomainError::InvalidCursor(s.to_string());

        if let Some((millis, id)) = s.split_once(':') {
            if let (Ok(millis), Ok(id)) = (millis.parse::<i64>(), id.parse::<Snowflake>()) {
                let created_at = Utc.timestamp_millis_opt(millis).single().ok_or_else(invalid)?;
                return Ok(Self {
                    created_at,
                    id: Some(id),
                });
            }
        }

        if let Ok(millis) = s.parse::<i64>() {
            let created_at = Utc.timestamp_millis_opt(millis).single().ok_or_else(invalid)?;
            return Ok(Self { created_at, id: None });
        }

        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self {
                created_at: dt.with_timezone(&Utc),
                id: None,
            })
            .map_err(|_| invalid())
    }
}

/// One merged page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub items: Vec<FeedEntry>,
    /// `None` when the page is not full
    pub next_cursor: Option<FeedCursor>,
}

/// Merge stream results into one page
///
/// Items are keyed by content id, keeping the highest-priority reason, then
/// ordered newest first (ties by id, descending) and cut to `limit`.
pub fn merge_feed(entries: impl IntoIterator<Item = FeedEntry>, limit: usize) -> FeedPage {
    let mut by_id: HashMap<Snowflake, FeedEntry> = HashMap::new();
    for entry in entries {
        match by_id.get_mut(&entry.content.id()) {
            Some(existing) => {
                if entry.reason < existing.reason {
                    existing.reason = entry.reason;
                }
            }
            None => {
                by_id.insert(entry.content.id(), entry);
            }
        }
    }

    let mut items: Vec<FeedEntry> = by_id.into_values().collect();
    items.sort_by_key(|e| std::cmp::Reverse(e.sort_key()));
    items.truncate(limit);

    let next_cursor = if limit > 0 && items.len() == limit {
        items.last().map(FeedCursor::after)
    } else {
        None
    };

    FeedPage { items, next_cursor }
}
