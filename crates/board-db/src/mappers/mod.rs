//! Entity to model mappers
//!
//! This module provides conversions between domain entities (board-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod comment;
mod post;
mod topic;
mod user;

pub use comment::CommentInsert;
pub use post::PostInsert;
pub use user::UserUpsert;
