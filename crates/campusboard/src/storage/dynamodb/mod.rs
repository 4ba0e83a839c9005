//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of
//! [`ItemStore`](campusboard_core::storage::ItemStore) using `aws-sdk-dynamodb`.
//! The table only needs the `PK`/`SK` string key schema; there are no
//! secondary indexes.

mod conversions;
mod error;
mod store;

pub use store::DynamoDbStore;
