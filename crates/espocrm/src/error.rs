//! Error types for the espocrm library.
//!
//! This module provides a unified error type with explicit variants for
//! request composition, authentication, HTTP status, and codec failures.

use thiserror::Error;

/// The unified error type for espocrm operations.
///
/// Every failed operation surfaces one of these variants to the caller;
/// nothing is retried or swallowed internally.
#[derive(Debug, Error)]
pub enum Error {
    /// The request URL could not be composed.
    #[error("invalid URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    /// An entity type name failed validation.
    #[error("invalid entity '{value}': {reason}")]
    InvalidEntity { value: String, reason: String },

    /// An authenticated call was attempted with no session token and no
    /// static API key available.
    #[error("authentication token missing: log in or configure an API key")]
    MissingAuthToken,

    /// The server returned HTTP 401.
    #[error("unauthorized: token may be expired or invalid")]
    Unauthorized,

    /// The server returned a non-2xx status, or the transport failed to
    /// yield a classifiable response (status is -1 in that case).
    #[error("request failed with HTTP {status}: {message}")]
    HttpStatus { status: i32, message: String },

    /// A response body did not structurally decode as the requested type.
    #[error("failed to decode response: {0}")]
    Decoding(String),

    /// A request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encoding(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Error::Decoding(err.to_string());
        }
        // Transport failures (DNS, connect, timeout) carry no status code
        // and are reported as an unclassifiable HTTP outcome.
        let status = err.status().map_or(-1, |s| i32::from(s.as_u16()));
        Error::HttpStatus {
            status,
            message: err.to_string(),
        }
    }
}
