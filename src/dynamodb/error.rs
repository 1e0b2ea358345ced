//! Error types for table operations and the mapping from AWS SDK errors.

use std::fmt::Debug;
use std::time::Duration;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use thiserror::Error;

use crate::dynamodb::CreateOutcome;

/// Result type alias for the dynamodb module.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during table operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "cannot load credentials for profile '{profile}': {message}. \
         Make sure your credentials file is at the correct location ({location}) \
         and is in valid format"
    )]
    Auth {
        profile: String,
        location: String,
        message: String,
    },

    #[error("table '{table_name}' did not become active within {timeout:?}")]
    ProvisionTimeout {
        table_name: String,
        timeout: Duration,
    },

    #[error("invalid item: {0}")]
    Validation(String),

    #[error("table '{table_name}' not found")]
    NotFound { table_name: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to build request: {0}")]
    Build(#[from] aws_sdk_dynamodb::error::BuildError),

    #[error("failed to convert item: {0}")]
    Conversion(#[from] serde_dynamo::Error),
}

impl Error {
    pub(crate) fn not_found(table_name: &str) -> Self {
        Error::NotFound {
            table_name: table_name.to_string(),
        }
    }
}

/// Map a CreateTable SDK error; an existing table is not a failure.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
) -> Result<CreateOutcome> {
    let message = DisplayErrorContext(&err).to_string();
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => Ok(CreateOutcome::AlreadyExists),
        _ => Err(Error::Transport(format!("CreateTable failed: {message}"))),
    }
}

/// Map a DescribeTable SDK error.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
    table_name: &str,
) -> Error {
    let message = DisplayErrorContext(&err).to_string();
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => Error::not_found(table_name),
        _ => Error::Transport(format!("DescribeTable failed: {message}")),
    }
}

/// Map a PutItem SDK error.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> Error {
    let message = DisplayErrorContext(&err).to_string();
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => Error::not_found(table_name),
        _ => Error::Transport(format!("PutItem failed: {message}")),
    }
}

/// Map a Scan SDK error.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table_name: &str,
) -> Error {
    let message = DisplayErrorContext(&err).to_string();
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => Error::not_found(table_name),
        _ => Error::Transport(format!("Scan failed: {message}")),
    }
}
