//! `HttpTransport` implementation on top of reqwest.

use std::time::Duration;

use async_trait::async_trait;
use concepter_core::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use reqwest::Client;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport {
                method: reqwest::Method::GET,
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let transport_error = |e: reqwest::Error| HttpError::Transport {
            method: method.clone(),
            url: url.clone(),
            message: e.to_string(),
        };

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        tracing::debug!("[Http] {} {}", method, url);
        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::debug!("[Http] {} {} -> {}", method, url, status);
            return Err(HttpError::Status {
                status,
                method,
                url,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let mut response = HttpResponse::new(status, bytes.to_vec());
        response.headers = response_headers;
        Ok(response)
    }
}
