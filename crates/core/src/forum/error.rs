use thiserror::Error;

/// Errors raised while validating forum input before it reaches the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("{field} too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
    #[error("Patch must set at least one field")]
    EmptyPatch,
    #[error("Search query cannot be empty")]
    EmptyQuery,
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::Empty("title").to_string(),
            "title cannot be empty"
        );
        assert_eq!(
            ValidationError::TooLong {
                field: "title",
                max: 300
            }
            .to_string(),
            "title too long (max 300 characters)"
        );
        assert_eq!(
            ValidationError::EmptyPatch.to_string(),
            "Patch must set at least one field"
        );
    }
}
