use thiserror::Error;

use crate::forum::ValidationError;

use super::keys::KeyError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    /// A concurrent writer changed the record between our read and our write.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// A conditional store write was rejected. Callers translate this into
    /// `AlreadyExists` or `Conflict` depending on what they asked for.
    #[error("Condition failed: {0}")]
    ConditionFailed(String),
    #[error("Payload too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// Returns true when the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Conflict(_))
    }
}

impl From<KeyError> for RepositoryError {
    fn from(err: KeyError) -> Self {
        Self::InvalidData(err.to_string())
    }
}

impl From<ValidationError> for RepositoryError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidData(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "Post",
            id: "abc-123".to_string(),
        };
        assert_eq!(error.to_string(), "Post not found: abc-123");
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "UserProfile",
            id: "u1".to_string(),
        };
        assert_eq!(error.to_string(), "UserProfile already exists: u1");
    }

    #[test]
    fn test_repository_error_too_large_display() {
        let error = RepositoryError::TooLarge {
            size: 20_000_000,
            limit: 15_728_640,
        };
        assert_eq!(
            error.to_string(),
            "Payload too large: 20000000 bytes exceeds the 15728640 byte limit"
        );
    }

    #[test]
    fn test_repository_error_store_unavailable_display() {
        let error = RepositoryError::StoreUnavailable("timeout after 3s".to_string());
        assert_eq!(error.to_string(), "Store unavailable: timeout after 3s");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(RepositoryError::StoreUnavailable("x".into()).is_retryable());
        assert!(RepositoryError::Conflict("x".into()).is_retryable());
        assert!(!RepositoryError::InvalidData("x".into()).is_retryable());
        assert!(!RepositoryError::NotFound {
            entity_type: "Post",
            id: "p".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_key_error_folds_into_invalid_data() {
        let error: RepositoryError = KeyError::MalformedId("a#b".to_string()).into();
        assert!(matches!(error, RepositoryError::InvalidData(_)));
    }
}
