//! HTTP value types and the transport seam.
//!
//! The client never talks to a concrete HTTP library directly: everything goes
//! through `HttpTransport`, which the infrastructure layer implements with
//! reqwest and tests implement with scripted fakes.

pub mod error;
pub mod request;

use async_trait::async_trait;

pub use error::{
    ACCESS_DENIED_MESSAGE, FailureKind, HttpError, NOT_FOUND_MESSAGE, SERVER_ERROR_MESSAGE,
};
pub use request::{HttpRequest, HttpResponse};
pub use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
pub use reqwest::{Method, StatusCode, Url};

/// Sends a single request and returns its response.
///
/// Implementations must report non-2xx statuses as `HttpError::Status`, so
/// that middleware can treat every failure uniformly.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}
