//! API client with an ordered middleware chain.

use std::sync::Arc;

use async_trait::async_trait;
use concepter_core::http::{HttpError, HttpRequest, HttpResponse, HttpTransport, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A step in the request pipeline.
///
/// A middleware may pass the request through (`next.run(request)`),
/// short-circuit with its own result, or dispatch a different request.
/// `Next` is `Copy`, so a middleware may dispatch more than once.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: HttpRequest, next: Next<'_>)
    -> Result<HttpResponse, HttpError>;
}

/// The remainder of the chain after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    transport: &'a dyn HttpTransport,
    middlewares: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub async fn run(self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        match self.middlewares.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    transport: self.transport,
                    middlewares: rest,
                };
                current.handle(request, next).await
            }
            None => self.transport.send(request).await,
        }
    }
}

/// JSON API client rooted at a base URL.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl ApiClient {
    /// Creates a client without middleware.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            middlewares: Vec::new(),
        }
    }

    /// Appends a middleware. Middlewares run in the order they were added.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `request` through the middleware chain.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let next = Next {
            transport: self.transport.as_ref(),
            middlewares: &self.middlewares,
        };
        next.run(request).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, HttpError> {
        let url = self.endpoint(path, &[], query)?;
        self.execute(HttpRequest::get(url)).await?.json()
    }

    /// Fetches the resource `id` below `path`. The id is percent-encoded as a
    /// single path segment.
    pub async fn get_item<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<T, HttpError> {
        let url = self.endpoint(path, &[id], &[])?;
        self.execute(HttpRequest::get(url)).await?.json()
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = HttpRequest::post(self.url(path), encode(body)?);
        self.execute(request).await?.json()
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = HttpRequest::put(self.url(path), encode(body)?);
        self.execute(request).await?.json()
    }

    pub async fn put_item<T, B>(&self, path: &str, id: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path, &[id], &[])?;
        self.execute(HttpRequest::put(url, encode(body)?)).await?.json()
    }

    pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), HttpError> {
        let url = self.endpoint(path, &[], query)?;
        self.execute(HttpRequest::delete(url)).await?;
        Ok(())
    }

    pub async fn delete_item(
        &self,
        path: &str,
        id: &str,
        query: &[(&str, String)],
    ) -> Result<(), HttpError> {
        let url = self.endpoint(path, &[id], query)?;
        self.execute(HttpRequest::delete(url)).await?;
        Ok(())
    }

    /// Builds the URL for `path`, appending `segments` (percent-encoded) and
    /// the query string.
    fn endpoint(
        &self,
        path: &str,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<String, HttpError> {
        let raw = self.url(path);
        if segments.is_empty() && query.is_empty() {
            return Ok(raw);
        }

        let invalid = |message: String| HttpError::InvalidUrl {
            url: raw.clone(),
            message,
        };
        let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| invalid("URL cannot carry path segments".to_string()))?
                .pop_if_empty()
                .extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.into())
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, HttpError> {
    serde_json::to_value(body).map_err(|e| HttpError::Encode(e.to_string()))
}
