//! Error types for the search layer.
//!
//! Failures are grouped the same way callers react to them: the store or the
//! transport failed ([`BackendError`]), a document was missing or malformed
//! ([`DocumentError`]), or a query could not be assembled locally
//! ([`QueryError`]). Store failures keep the status, error type and reason the
//! node reported so nothing is lost on the way to the caller.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use serde_json::Value;
use thiserror::Error;

/// The primary error type for all repository and template operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Transport and store-side errors
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Document state errors
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Local query assembly errors
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Errors raised by the transport or reported by the Elasticsearch node.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The node answered but reported itself unusable.
    #[error("elasticsearch unavailable: {message}")]
    Unavailable { message: String },

    /// The node could not be reached.
    #[error("connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    /// The store rejected a request (query syntax, missing index, ...).
    #[error("elasticsearch returned {status} ({error_type}): {reason}")]
    Store {
        status: u16,
        error_type: String,
        reason: String,
    },

    /// Internal client error.
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

/// Errors related to individual documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document does not exist in the index.
    #[error("document not found: {index}/{id}")]
    NotFound { index: String, id: String },

    /// The entity has never been saved, so it has no id to address.
    #[error("entity for index {index} has no id")]
    MissingId { index: String },
}

/// Errors raised while building a query before it is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A `?N` placeholder has no argument at position N.
    #[error("placeholder ?{position} has no argument ({provided} provided)")]
    MissingArgument { position: usize, provided: usize },

    /// A derived query was bound with the wrong number of arguments.
    #[error("query {method} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// A derived query names a property the mapping does not have.
    #[error("no property '{property}' found for {method}")]
    UnknownProperty { method: String, property: String },

    /// A method name that cannot be turned into a query.
    #[error("invalid query method name '{method}': {message}")]
    InvalidMethodName { method: String, message: String },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::Serialization {
            message: err.to_string(),
        })
    }
}

impl From<elasticsearch::Error> for StorageError {
    fn from(err: elasticsearch::Error) -> Self {
        StorageError::Backend(BackendError::Internal {
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

impl StorageError {
    /// Builds a store error from a non-success status and the response body.
    ///
    /// Elasticsearch reports failures as
    /// `{"error": {"type": "...", "reason": "..."}, "status": 400}`; bodies that
    /// don't follow that shape are kept verbatim as the reason.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));

        let (error_type, reason) = match error {
            Some(Value::Object(obj)) => (
                obj.get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown")
                    .to_string(),
                obj.get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or_default()
                    .to_string(),
            ),
            Some(Value::String(s)) => ("unknown".to_string(), s.clone()),
            _ => ("unknown".to_string(), body.to_string()),
        };

        StorageError::Backend(BackendError::Store {
            status,
            error_type,
            reason,
        })
    }

    /// Returns the store's error type when this error came from the node.
    pub fn store_error_type(&self) -> Option<&str> {
        match self {
            StorageError::Backend(BackendError::Store { error_type, .. }) => Some(error_type),
            _ => None,
        }
    }

    /// Returns true if the document or index was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::Document(DocumentError::NotFound { .. })
                | StorageError::Backend(BackendError::Store { status: 404, .. })
        )
    }
}
