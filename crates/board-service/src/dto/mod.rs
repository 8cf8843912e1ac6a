//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    CreateCommentRequest, CreatePostRequest, CreateTopicRequest, FeedQuery, ReactRequest,
    ThreadQuery,
};

// Re-export commonly used response types
pub use responses::{
    CommentResponse, DeletedResponse, FeedItemResponse, FeedResponse, FollowResponse,
    HealthChecks, HealthResponse, InteractionKind, InteractionResponse, PostResponse,
    ReactionResponse, ReadinessResponse, ThreadResponse, TopicRefResponse, TopicResponse,
    UnreadCountResponse, UserReactionsResponse, UserResponse, ViewResponse,
};
