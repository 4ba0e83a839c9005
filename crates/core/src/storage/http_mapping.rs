//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! This module provides HTTP status code mappings for [`RepositoryError`] variants,
//! following the Functional Core pattern - pure functions with no side effects.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `AlreadyExists`, `Conflict`, `ConditionFailed` -> 409 (Conflict)
/// - `TooLarge` -> 413 (Payload Too Large)
/// - `InvalidData` -> 400 (Bad Request)
/// - `StoreUnavailable` -> 503 (Service Unavailable)
/// - `QueryFailed`, `Serialization` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use campusboard_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Post",
///     id: "abc-123".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::Conflict(_) => 409,
        RepositoryError::ConditionFailed(_) => 409,
        RepositoryError::TooLarge { .. } => 413,
        RepositoryError::InvalidData(_) => 400,
        RepositoryError::StoreUnavailable(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::NotFound {
            entity_type: "Comment",
            id: "c-1".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let exists = RepositoryError::AlreadyExists {
            entity_type: "Attachment",
            id: "f1".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&exists), 409);
        assert_eq!(
            repository_error_to_status_code(&RepositoryError::Conflict("vote race".into())),
            409
        );
    }

    #[test]
    fn test_too_large_maps_to_413() {
        let error = RepositoryError::TooLarge {
            size: 20_000_000,
            limit: 15_728_640,
        };
        assert_eq!(repository_error_to_status_code(&error), 413);
    }

    #[test]
    fn test_store_unavailable_maps_to_503() {
        let error = RepositoryError::StoreUnavailable("dispatch failure".to_string());
        assert_eq!(repository_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_serialization_maps_to_500() {
        let error = RepositoryError::Serialization("missing field title".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
    }

    #[test]
    fn test_invalid_data_maps_to_400() {
        let error = RepositoryError::InvalidData("empty patch".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);
    }
}
