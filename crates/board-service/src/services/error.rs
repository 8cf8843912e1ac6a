//! Service layer error types

use board_core::DomainError;
use thiserror::Error;

/// Service layer error type
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rule violation or store failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A `ServiceContextBuilder` was built without a required dependency
    #[error("{0} is required")]
    MissingDependency(&'static str),
}

impl ServiceError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) if e.is_not_found() => 404,
            Self::Domain(e) if e.is_authorization() => 403,
            Self::Domain(e) if e.is_validation() => 400,
            Self::Domain(e) if e.is_conflict() => 409,
            Self::Domain(_) | Self::MissingDependency(_) => 500,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::MissingDependency(_) => "MISSING_DEPENDENCY",
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::{ReactionTargetKind, Snowflake};

    #[test]
    fn test_domain_mapping() {
        let err = ServiceError::from(DomainError::MaxDepthExceeded { max: 3 });
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "MAX_DEPTH_EXCEEDED");

        let err = ServiceError::from(DomainError::TargetNotFound {
            kind: ReactionTargetKind::Post,
            id: Snowflake::new(1),
        });
        assert_eq!(err.status_code(), 404);

        let err = ServiceError::from(DomainError::NotAuthorOrAdmin("delete this comment"));
        assert_eq!(err.status_code(), 403);

        let err = ServiceError::from(DomainError::DatabaseError("pool closed".into()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_missing_dependency() {
        let err = ServiceError::MissingDependency("post_repo");
        assert_eq!(err.to_string(), "post_repo is required");
        assert_eq!(err.status_code(), 500);
    }
}
