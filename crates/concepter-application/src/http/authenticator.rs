use std::sync::Arc;

use async_trait::async_trait;
use concepter_core::auth::is_auth_endpoint;
use concepter_core::http::{HttpError, HttpRequest, HttpResponse};

use super::client::{Middleware, Next};
use crate::session::AuthSession;

/// Attaches `Authorization: Bearer <token>` to outbound requests.
///
/// Requests to the login, register and refresh endpoints, and requests made
/// while no token is stored, pass through untouched.
pub struct RequestAuthenticator {
    session: Arc<dyn AuthSession>,
}

impl RequestAuthenticator {
    pub fn new(session: Arc<dyn AuthSession>) -> Self {
        Self { session }
    }

    pub fn authorize(&self, request: HttpRequest) -> Result<HttpRequest, HttpError> {
        if is_auth_endpoint(&request.url) {
            return Ok(request);
        }
        match self.session.token() {
            Some(token) if !token.is_empty() => request.with_bearer(&token),
            _ => Ok(request),
        }
    }
}

#[async_trait]
impl Middleware for RequestAuthenticator {
    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse, HttpError> {
        let request = self.authorize(request)?;
        next.run(request).await
    }
}
