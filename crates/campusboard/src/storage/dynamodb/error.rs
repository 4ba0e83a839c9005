//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `campusboard_core::storage`.
//! Timeouts, connection failures and throttling become `StoreUnavailable`
//! so callers can tell them apart from real failures and retry.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use campusboard_core::storage::{ItemKey, RepositoryError};

/// Classify failures that never reached the service.
fn transport_error<E, R>(err: &SdkError<E, R>, operation: &str) -> Option<RepositoryError> {
    match err {
        SdkError::TimeoutError(_) => Some(RepositoryError::StoreUnavailable(format!(
            "{operation} timed out"
        ))),
        SdkError::DispatchFailure(_) => Some(RepositoryError::StoreUnavailable(format!(
            "{operation} could not reach DynamoDB"
        ))),
        _ => None,
    }
}

fn throttled(operation: &str) -> RepositoryError {
    RepositoryError::StoreUnavailable(format!("{operation} throttled, please retry"))
}

fn internal(operation: &str) -> RepositoryError {
    RepositoryError::StoreUnavailable(format!("{operation}: DynamoDB internal server error"))
}

fn table_not_found() -> RepositoryError {
    RepositoryError::QueryFailed("Table not found".to_string())
}

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err, "GetItem") {
        return mapped;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => table_not_found(),
        GetItemError::ProvisionedThroughputExceededException(_)
        | GetItemError::RequestLimitExceeded(_) => throttled("GetItem"),
        GetItemError::InternalServerError(_) => internal("GetItem"),
        err => RepositoryError::QueryFailed(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to RepositoryError.
///
/// A failed condition becomes `ConditionFailed`; the caller knows whether it
/// asked for "only if absent" or "only if unchanged".
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    key: &ItemKey,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err, "PutItem") {
        return mapped;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => {
            RepositoryError::ConditionFailed(key.to_string())
        }
        PutItemError::ResourceNotFoundException(_) => table_not_found(),
        PutItemError::ProvisionedThroughputExceededException(_)
        | PutItemError::RequestLimitExceeded(_) => throttled("PutItem"),
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            RepositoryError::Conflict(format!("Transaction conflict on {key}"))
        }
        PutItemError::InternalServerError(_) => internal("PutItem"),
        err => RepositoryError::QueryFailed(format!("PutItem failed: {:?}", err)),
    }
}

/// Map an UpdateItem SDK error to RepositoryError.
///
/// Updates are conditioned on the item existing, so a failed condition means
/// the item is gone.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    key: &ItemKey,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err, "UpdateItem") {
        return mapped;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => RepositoryError::NotFound {
            entity_type: "Item",
            id: key.to_string(),
        },
        UpdateItemError::ResourceNotFoundException(_) => table_not_found(),
        UpdateItemError::ProvisionedThroughputExceededException(_)
        | UpdateItemError::RequestLimitExceeded(_) => throttled("UpdateItem"),
        UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        UpdateItemError::TransactionConflictException(_) => {
            RepositoryError::Conflict(format!("Transaction conflict on {key}"))
        }
        UpdateItemError::InternalServerError(_) => internal("UpdateItem"),
        err => RepositoryError::QueryFailed(format!("UpdateItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    key: &ItemKey,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err, "DeleteItem") {
        return mapped;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => table_not_found(),
        DeleteItemError::ProvisionedThroughputExceededException(_)
        | DeleteItemError::RequestLimitExceeded(_) => throttled("DeleteItem"),
        DeleteItemError::TransactionConflictException(_) => {
            RepositoryError::Conflict(format!("Transaction conflict on {key}"))
        }
        DeleteItemError::InternalServerError(_) => internal("DeleteItem"),
        err => RepositoryError::QueryFailed(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err, "Query") {
        return mapped;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => table_not_found(),
        QueryError::ProvisionedThroughputExceededException(_)
        | QueryError::RequestLimitExceeded(_) => throttled("Query"),
        QueryError::InternalServerError(_) => internal("Query"),
        err => RepositoryError::QueryFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a Scan SDK error to RepositoryError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err, "Scan") {
        return mapped;
    }
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => table_not_found(),
        ScanError::ProvisionedThroughputExceededException(_)
        | ScanError::RequestLimitExceeded(_) => throttled("Scan"),
        ScanError::InternalServerError(_) => internal("Scan"),
        err => RepositoryError::QueryFailed(format!("Scan failed: {:?}", err)),
    }
}
