//! Database models - SQLx-compatible structs for PostgreSQL tables

mod comment;
mod post;
mod topic;
mod user;

pub use comment::CommentModel;
pub use post::PostModel;
pub use topic::TopicModel;
pub use user::UserModel;
