//! Error types for the Pobo API client.
//!
//! # Design
//! Every failure the client can produce is a variant of [`Error`]. The
//! server reports most problems through an `error` field in an otherwise
//! well-formed JSON body, so the HTTP status code never selects a variant.
//! Authentication and decode failures carry their own enums because callers
//! routinely match on the specific cause.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the session, transport and resource clients.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (connection, DNS, TLS, I/O).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body, or an entity inside it, could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The locale code is not one of the supported markets.
    #[error("Unsupported locale: {0}")]
    InvalidLocale(String),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// The server reported an `error`, or returned an unexpected shape.
    #[error("{0}")]
    Api(String),

    /// A request payload could not be encoded as JSON.
    #[error("Failed to encode request payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unexpected_format() -> Self {
        Error::Api("Unexpected response format".to_string())
    }
}

/// Failure of the underlying HTTP primitive. Carries the primitive's message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Transport error: {0}")]
pub struct TransportError(pub String);

/// Why a session could not obtain or provide a bearer token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The token endpoint answered with an `error` field.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// A token was requested while the session is not authenticated.
    #[error("Authentication error: Missing or invalid JWT token.")]
    MissingToken,

    /// The session was logged out and cannot authenticate again.
    #[error("Authentication error: Session has been logged out.")]
    LoggedOut,
}

/// Failures while turning server JSON into typed values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The response body is not a JSON object.
    #[error("Invalid JSON response: {body}")]
    InvalidJson { body: String },

    #[error("{model}: missing required field `{field}`")]
    MissingField {
        model: &'static str,
        field: &'static str,
    },

    #[error("{model}: field `{field}` {reason}")]
    InvalidField {
        model: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("{model}: expected a JSON object")]
    NotAnObject { model: &'static str },

    #[error("{model}: cannot parse timestamp {value}")]
    InvalidTimestamp { model: &'static str, value: String },

    /// A collection element is not an object or failed to decode.
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}
