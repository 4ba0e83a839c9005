//! Error types for DynamoDB operations.

use thiserror::Error;

/// Result type alias for dynamodb module.
pub type Result<T> = std::result::Result<T, DynamodbError>;

/// Errors that can occur during DynamoDB operations.
#[derive(Error, Debug)]
pub enum DynamodbError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Table '{table_name}' is missing from the DescribeTable response")]
    MissingDescription { table_name: String },

    #[error("Table '{table_name}' has key schema {found:?}, expected {expected:?}")]
    KeySchemaMismatch {
        table_name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Timeout waiting for table to become active")]
    TableActivationTimeout,
}
