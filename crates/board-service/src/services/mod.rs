//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod comment;
pub mod context;
pub mod discovery;
pub mod error;
pub mod follow;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod topic;
pub mod user;

// Re-export all services for convenience
pub use comment::CommentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use discovery::DiscoveryService;
pub use error::{ServiceError, ServiceResult};
pub use follow::FollowService;
pub use notification::NotificationService;
pub use post::PostService;
pub use reaction::ReactionService;
pub use topic::TopicService;
pub use user::UserService;
