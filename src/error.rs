use std::path::PathBuf;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::RequestId;
use thiserror::Error;

/// Rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown key condition operator: {0}")]
    UnknownOperator(String),
    #[error("a value for partition key {0} is required")]
    MissingPartitionValue(String),
    #[error("between on {0} needs an upper bound")]
    MissingUpperBound(String),
    #[error("between on {0} needs a lower bound")]
    MissingLowerBound(String),
    #[error("{operator} cannot be used with numeric sort key {attribute}")]
    InvalidOperator { operator: String, attribute: String },
    #[error("{attribute} is a number attribute, {value:?} is not a number")]
    InvalidNumber { attribute: String, value: String },
    #[error("key attribute {0} has binary type, which cannot be entered as text")]
    UnsupportedKeyType(String),
    #[error("table {0} has no partition key to query")]
    NoPartitionKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct BackendError {
    pub operation: &'static str,
    pub message: String,
}

impl BackendError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    pub fn from_sdk<E>(operation: &'static str, err: &SdkError<E>) -> Self
    where
        E: ProvideErrorMetadata + RequestId + std::error::Error + 'static,
    {
        Self::new(operation, format_sdk_error(err))
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize item: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a single query or scan page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub fn format_sdk_error<E>(err: &SdkError<E>) -> String
where
    E: ProvideErrorMetadata + RequestId + std::error::Error + 'static,
{
    if let Some(service_err) = err.as_service_error() {
        let code = service_err.code().unwrap_or("ServiceError");
        let message = service_err.message().unwrap_or("").trim();
        let mut summary = if message.is_empty() {
            code.to_string()
        } else {
            format!("{code}: {message}")
        };
        if let Some(request_id) = service_err.request_id() {
            summary.push_str(&format!(" (request id: {request_id})"));
        }
        return summary;
    }
    DisplayErrorContext(err).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_names_the_operation() {
        let err = BackendError::new("Query", "ResourceNotFoundException: no table");
        assert_eq!(
            err.to_string(),
            "Query failed: ResourceNotFoundException: no table"
        );
    }

    #[test]
    fn umbrella_error_is_transparent() {
        let err: Error = ConfigError::MissingUpperBound("ts".to_string()).into();
        assert_eq!(err.to_string(), "between on ts needs an upper bound");
    }
}
