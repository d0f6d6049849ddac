//! HTTP failure types and their classification.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// A failed HTTP exchange.
#[derive(Error, Debug, Clone)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("{method} {url} failed with status {status}")]
    Status {
        status: StatusCode,
        method: Method,
        url: String,
        body: String,
    },

    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: Method,
        url: String,
        message: String,
    },

    /// A header could not be encoded.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Encode(String),

    /// The request URL could not be parsed.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The response body was not the expected JSON.
    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

impl HttpError {
    /// The response status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// User-facing message published for HTTP 5xx failures.
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
/// User-facing message published for HTTP 403 failures.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied.";
/// User-facing message published for HTTP 404 failures.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found.";

/// Category of a failed request, deciding how the client reacts to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401 on a resource endpoint: refresh the session and replay.
    Authentication,
    /// 401 on login/register/refresh: surfaced as-is.
    AuthEndpoint,
    /// 403
    Authorization,
    /// 404
    NotFound,
    /// 5xx
    Server,
    /// 400, 422 and every other status left for the caller to render.
    Validation,
    /// No response at all.
    Transport,
}

impl FailureKind {
    pub fn classify(status: Option<StatusCode>, is_auth_endpoint: bool) -> Self {
        let Some(status) = status else {
            return Self::Transport;
        };

        match status {
            StatusCode::UNAUTHORIZED if is_auth_endpoint => Self::AuthEndpoint,
            StatusCode::UNAUTHORIZED => Self::Authentication,
            s if s.is_server_error() => Self::Server,
            StatusCode::FORBIDDEN => Self::Authorization,
            StatusCode::NOT_FOUND => Self::NotFound,
            _ => Self::Validation,
        }
    }

    /// The shared, UI-visible message for this failure, if it publishes one.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Server => Some(SERVER_ERROR_MESSAGE),
            Self::Authorization => Some(ACCESS_DENIED_MESSAGE),
            Self::NotFound => Some(NOT_FOUND_MESSAGE),
            _ => None,
        }
    }
}
