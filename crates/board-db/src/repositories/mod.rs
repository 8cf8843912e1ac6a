//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in board-core.
//! Each repository handles database operations for a specific domain entity.

mod comment;
mod error;
mod follow;
mod ledger;
mod post;
mod topic;
mod user;

pub use comment::PgCommentRepository;
pub use follow::PgFollowRepository;
pub use post::PgPostRepository;
pub use topic::PgTopicRepository;
pub use user::PgUserRepository;
