//! Value objects - immutable types that represent domain concepts

mod identity;
mod snowflake;
mod target;

pub use identity::{ActorKey, Author, ReplyTarget, ANONYMOUS_NAME};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use target::{FollowState, FollowTarget, ReactionTargetKind};
