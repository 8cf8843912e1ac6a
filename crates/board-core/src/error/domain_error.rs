//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{ReactionTargetKind, Snowflake};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Post not found: {0}")]
    PostNotFound(Snowflake),

    #[error("Comment not found: {0}")]
    CommentNotFound(Snowflake),

    #[error("Topic not found: {0}")]
    TopicNotFound(Snowflake),

    #[error("Reaction target not found: {kind} {id}")]
    TargetNotFound { kind: ReactionTargetKind, id: Snowflake },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parent comment not found: {0}")]
    ParentNotFound(Snowflake),

    #[error("Parent comment does not belong to this post")]
    ParentNotInPost,

    #[error("Maximum thread depth of {max} exceeded")]
    MaxDepthExceeded { max: i32 },

    #[error("Invalid emoji")]
    InvalidEmoji,

    #[error("Too many topics: max {max}")]
    TooManyTopics { max: usize },

    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only the author or an admin may {0}")]
    NotAuthorOrAdmin(&'static str),

    #[error("Not allowed to view another user's {0}")]
    NotOwner(&'static str),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Topic name already in use: {0}")]
    TopicNameTaken(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::TopicNotFound(_) => "UNKNOWN_TOPIC",
            Self::TargetNotFound { .. } => "TARGET_NOT_FOUND",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentNotInPost => "PARENT_NOT_IN_POST",
            Self::MaxDepthExceeded { .. } => "MAX_DEPTH_EXCEEDED",
            Self::InvalidEmoji => "INVALID_EMOJI",
            Self::TooManyTopics { .. } => "TOO_MANY_TOPICS",
            Self::SelfFollow => "SELF_FOLLOW",
            Self::InvalidCursor(_) => "INVALID_CURSOR",

            // Authorization
            Self::NotAuthorOrAdmin(_) => "NOT_AUTHOR_OR_ADMIN",
            Self::NotOwner(_) => "NOT_OWNER",

            // Conflict
            Self::TopicNameTaken(_) => "TOPIC_NAME_TAKEN",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::PostNotFound(_)
                | Self::CommentNotFound(_)
                | Self::TopicNotFound(_)
                | Self::TargetNotFound { .. }
        )
    }

    /// Check if this is a validation error
    ///
    /// A missing parent is the caller's mistake, so it is reported as a
    /// validation failure rather than a missing resource.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::ParentNotFound(_)
                | Self::ParentNotInPost
                | Self::MaxDepthExceeded { .. }
                | Self::InvalidEmoji
                | Self::TooManyTopics { .. }
                | Self::SelfFollow
                | Self::InvalidCursor(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAuthorOrAdmin(_) | Self::NotOwner(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::TopicNameTaken(_))
    }
}
