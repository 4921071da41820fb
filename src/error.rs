//! Error types for procwire-urls.

use thiserror::Error;

use crate::uri::UriError;

/// Boxed error returned by URI handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all registry and host operations.
#[derive(Debug, Error)]
pub enum UrlsError {
    /// The extension already has a live URI handler.
    #[error("Protocol handler already registered for extension {0}")]
    DuplicateRegistration(String),

    /// A URI handler returned an error during dispatch.
    #[error("URI handler {handle} failed: {source}")]
    Handler {
        /// Handle of the failing registration.
        handle: u64,
        /// Error returned by the handler.
        #[source]
        source: BoxError,
    },

    /// A URI handler panicked during dispatch.
    #[error("URI handler {handle} panicked: {message}")]
    HandlerPanicked {
        /// Handle of the failing registration.
        handle: u64,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// A URI string failed to parse or validate.
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] UriError),

    /// The host answered a call with an error.
    #[error("Remote error: {0}")]
    Remote(String),

    /// The host channel is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The host did not answer within the configured timeout.
    #[error("Call timed out")]
    CallTimeout,

    /// Inbound call for a method this side does not implement.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// JSON error (configuration only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using UrlsError.
pub type Result<T> = std::result::Result<T, UrlsError>;
