//! Request and response value types passed through the middleware chain.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::HttpError;

/// An outbound HTTP request.
///
/// Requests are plain values: middleware that needs a modified request
/// clones it, so the original stays available for replay.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, url).with_json(body)
    }

    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, url).with_json(body)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Sets the JSON body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets (or replaces) a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, HttpError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Returns a copy of this request carrying `Authorization: Bearer <token>`.
    ///
    /// Method, URL, body and every other header are preserved; an existing
    /// `Authorization` header is replaced.
    pub fn with_bearer(&self, token: &str) -> Result<Self, HttpError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| HttpError::InvalidHeader(format!("authorization: {}", e)))?;
        value.set_sensitive(true);

        let mut request = self.clone();
        request.headers.insert(AUTHORIZATION, value);
        Ok(request)
    }

    /// Returns a header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the `Authorization` header, if any.
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
    }
}

/// A successful HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Builds a 200 response with a JSON body.
    pub fn json_ok(value: &Value) -> Self {
        Self::new(StatusCode::OK, value.to_string().into_bytes())
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        let bytes: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(bytes).map_err(|e| HttpError::Decode(e.to_string()))
    }
}
