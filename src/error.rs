//! Contains the `Error` and `Result` types that `docstore` uses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The result type for all methods that can return an error in the `docstore` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `docstore` crate. The inner [`ErrorKind`] is wrapped in an
/// `Arc` to allow the errors to be cloned.
#[derive(Clone, Debug, Error)]
#[error("{kind}")]
#[non_exhaustive]
pub struct Error {
    /// The type of error that occurred.
    pub kind: Arc<ErrorKind>,
}

impl Error {
    /// Creates an `InvalidArgument` error with the provided message.
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ErrorKind::InvalidArgument {
            message: message.into(),
        }
        .into()
    }

    /// Creates an `Authentication` error with the provided reason.
    pub(crate) fn authentication(message: impl Into<String>) -> Self {
        ErrorKind::Authentication {
            message: message.into(),
        }
        .into()
    }

    /// Creates a `Query` error for query text that could not be compiled.
    pub(crate) fn query(message: impl Into<String>) -> Self {
        ErrorKind::Query {
            message: message.into(),
        }
        .into()
    }

    /// The status classifier attached to this error, if the store reported one.
    ///
    /// Query-compilation failures are classified as [`StatusCode::BadRequest`] even though they
    /// are detected before the query text reaches the store; the store would reject the same
    /// text with that status.
    pub fn status(&self) -> Option<StatusCode> {
        match self.kind.as_ref() {
            ErrorKind::Api(api) => Some(api.status),
            ErrorKind::Query { .. } => Some(StatusCode::BadRequest),
            _ => None,
        }
    }

    /// Whether the store reported that the addressed resource does not exist.
    ///
    /// This is the only recoverable classification: the ensure-exists operations substitute a
    /// create when they observe it. Every other error is propagated unchanged.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NotFound)
    }

    /// Whether the store rejected a create because the resource already exists.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::Conflict)
    }
}

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        Self {
            kind: Arc::new(err.into()),
        }
    }
}

impl std::ops::Deref for Error {
    type Target = Arc<ErrorKind>;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

/// The types of errors that can occur.
#[allow(missing_docs)]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An invalid argument was provided to a store operation. Raised client side, before
    /// anything is sent to the store.
    #[error("invalid argument: {message}")]
    #[non_exhaustive]
    InvalidArgument { message: String },

    /// The connection parameters were rejected before a session could be established.
    #[error("authentication failed: {message}")]
    #[non_exhaustive]
    Authentication { message: String },

    /// The store rejected an operation. The attached [`StatusCode`] classifies the rejection.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Query text could not be compiled into a predicate.
    #[error("invalid query: {message}")]
    #[non_exhaustive]
    Query { message: String },

    /// A document could not be converted to or from its typed representation.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An error reported by the store itself, carrying the status classifier the workflow
/// dispatches on.
#[derive(Clone, Debug, Error)]
#[error("{status} error from store: {message} (activity id: {activity_id})")]
#[non_exhaustive]
pub struct ApiError {
    /// The status classifier for the rejection.
    pub status: StatusCode,

    /// A human-readable description of what the store rejected.
    pub message: String,

    /// The per-operation id the store attached to the response, for correlating client-side
    /// reports with store-side logs.
    pub activity_id: Uuid,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            activity_id: Uuid::new_v4(),
        }
    }
}

/// The status classifier attached to store-reported errors.
///
/// Only [`StatusCode::NotFound`] receives special handling anywhere in this crate; the
/// remaining classifications exist so callers can report failures precisely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum StatusCode {
    /// The request was malformed or violated a store constraint.
    BadRequest,

    /// The presented account key was not accepted.
    Unauthorized,

    /// The addressed resource does not exist.
    NotFound,

    /// A resource with the same identity already exists.
    Conflict,

    /// The store failed internally.
    Internal,
}

impl StatusCode {
    /// The numeric code used by the store's wire protocol for this classification.
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::NotFound => 404,
            StatusCode::Conflict => 409,
            StatusCode::Internal => 500,
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatusCode::BadRequest => "BadRequest",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::NotFound => "NotFound",
            StatusCode::Conflict => "Conflict",
            StatusCode::Internal => "Internal",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_found_is_the_only_recoverable_classification() {
        let err: Error = ApiError::new(StatusCode::NotFound, "dbs/FamilyDB does not exist").into();
        assert!(err.is_not_found());
        assert!(!err.is_conflict());

        let err: Error = ApiError::new(StatusCode::Conflict, "already exists").into();
        assert!(!err.is_not_found());
        assert!(err.is_conflict());
        assert_eq!(err.status(), Some(StatusCode::Conflict));
    }

    #[test]
    fn client_side_errors_carry_no_store_status() {
        let err = Error::invalid_argument("document has no id");
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }

    #[test]
    fn query_errors_classify_as_bad_request() {
        let err = Error::query("expected literal after '='");
        assert_eq!(err.status(), Some(StatusCode::BadRequest));
    }

    #[test]
    fn status_codes_match_the_wire_protocol() {
        assert_eq!(StatusCode::NotFound.code(), 404);
        assert_eq!(StatusCode::Conflict.code(), 409);
        assert_eq!(StatusCode::NotFound.to_string(), "NotFound (404)");
    }
}
