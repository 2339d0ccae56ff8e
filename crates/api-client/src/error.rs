use core_types::{ColumnType, CoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Missing or malformed endpoint, key or schema. Not retryable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service rejected the API key.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The request never produced a response (connect failure, timeout, broken body).
    #[error("Network error: {0}")]
    Network(String),

    /// The query was built against fields or shapes its descriptor does not allow.
    #[error("Invalid query: {0}")]
    Validation(String),

    /// The service received the request and refused it.
    #[error("Query rejected by the server (HTTP {status}): {message}")]
    Query {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Network(format!("request timed out: {}", e))
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<CoreError> for ClientError {
    fn from(e: CoreError) -> Self {
        ClientError::Validation(e.to_string())
    }
}

/// A response row that does not fit its row schema.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MappingError {
    #[error("Column '{column}' is missing or null but is declared non-nullable")]
    MissingColumn { column: String },

    #[error("Column '{column}' holds {found}, which cannot be read as {expected}")]
    Coercion {
        column: String,
        expected: ColumnType,
        found: String,
    },

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Failed to decode a row of {table}: {message}")]
    Decode { table: String, message: String },
}
