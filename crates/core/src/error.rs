//! Error types for mall
//!
//! Every failure surfaces as a value of [`Error`]. A missing object is not an
//! error: lookups return [`crate::Lookup::NotFound`] instead.

use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use thiserror::Error;

/// Result type alias for mall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mall operations
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument was rejected before any I/O
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A request (URL, header) could not be constructed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The transport did not produce a response
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error(transparent)]
    Service(Box<ServiceError>),

    /// A success response whose body could not be decoded or did not match the request
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The service returned a logically impossible response
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Whether retrying the same request may succeed
    ///
    /// Transport failures, 5xx statuses and malformed success bodies are
    /// transient. Client errors and protocol violations never are.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) | Error::MalformedResponse(_) => true,
            Error::Service(e) => e.status.is_server_error(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
            ),
            Error::InvalidArgument(_)
            | Error::InvalidRequest(_)
            | Error::ProtocolViolation(_)
            | Error::Config(_)
            | Error::Cancelled => false,
        }
    }

    /// The decoded service error, if the service answered with a failure status
    pub fn service(&self) -> Option<&ServiceError> {
        match self {
            Error::Service(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        self.service().map(|e| e.status)
    }
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        Error::Service(Box::new(err))
    }
}

/// A non-success response from the object storage service
///
/// The raw body and headers are kept for display and diagnostics. The
/// provider fields are filled from the XML error document when the body
/// decodes, and stay `None` otherwise.
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// Operation that failed, e.g. `ListBucket`
    pub op: &'static str,
    pub status: StatusCode,
    pub body: Bytes,
    pub headers: HeaderMap,

    /// Provider error code, e.g. `NoSuchBucket`
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
    /// Bucket the provider reports the error against
    pub bucket: Option<String>,

    /// Endpoint to retarget requests to after a `TemporaryRedirect`
    pub use_endpoint: Option<String>,
}

impl ServiceError {
    pub fn new(op: &'static str, status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            op,
            status,
            body,
            headers,
            code: None,
            message: None,
            request_id: None,
            bucket: None,
            use_endpoint: None,
        }
    }

    /// Whether the raw body looks like an XML error document
    fn has_error_document(&self) -> bool {
        const MARKER: &[u8] = b"<Error>";
        self.body.windows(MARKER.len()).any(|w| w == MARKER)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_error_document() {
            write!(
                f,
                "{}: status {}: {}",
                self.op,
                self.status.as_u16(),
                String::from_utf8_lossy(&self.body)
            )
        } else {
            write!(f, "{}: status {}", self.op, self.status.as_u16())
        }
    }
}

impl std::error::Error for ServiceError {}
