//! Axum extractors for request handling
//!
//! Custom extractors for caller identity, validation, paths and pagination.

mod auth;
mod pagination;
mod path;
mod validated;

pub use auth::{Actor, AuthUser, OptionalAuthUser};
pub use pagination::{Pagination, PaginationParams};
pub use path::SnowflakePath;
pub use validated::ValidatedJson;
