//! Domain entities - core business objects

mod comment;
mod post;
mod reaction;
mod topic;
mod user;

use chrono::{DateTime, Utc};

pub use comment::{excerpt, Comment, MAX_THREAD_DEPTH};
pub use post::{Post, TopicRef, COMMENT_HEAT_WEIGHT, MAX_POST_TOPICS};
pub use reaction::{ReactionChange, ReactionLedger, MAX_EMOJI_BYTES};
pub use topic::{Topic, DEFAULT_TOPIC_ICON};
pub use user::{User, UserRole};

/// Current time truncated to milliseconds, the precision feed cursors carry
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
