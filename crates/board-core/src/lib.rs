//! # board-core
//!
//! Domain layer containing entities, value objects, repository traits and the
//! pure algorithms of the board: comment trees, reaction ledgers and feed
//! merging. This crate has zero dependencies on infrastructure (database, web
//! framework, etc.).

pub mod entities;
pub mod error;
pub mod feed;
pub mod thread;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    excerpt, Comment, Post, ReactionChange, ReactionLedger, Topic, TopicRef, User, UserRole,
    MAX_POST_TOPICS, MAX_THREAD_DEPTH,
};
pub use error::DomainError;
pub use feed::{
    clamp_feed_limit, merge_feed, FeedContent, FeedCursor, FeedEntry, FeedPage, FeedReason,
};
pub use thread::{agent_placement, CommentTree, ReplyPlacement, SortMode, ThreadNode};
pub use traits::{
    CommentRepository, FollowRepository, PostRepository, RepoResult, TopicRepository,
    UserRepository,
};
pub use value_objects::{
    ActorKey, Author, FollowState, FollowTarget, ReactionTargetKind, ReplyTarget, Snowflake,
    SnowflakeGenerator, SnowflakeParseError, ANONYMOUS_NAME,
};
