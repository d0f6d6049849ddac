//! Failure recovery middleware.
//!
//! A 401 from a resource endpoint triggers one token refresh followed by a
//! replay of the original request. Other failures are classified and, for
//! 403/404/5xx, published to the shared error slot. Every failure still
//! reaches the caller.

use std::sync::Arc;

use async_trait::async_trait;
use concepter_core::auth::is_auth_endpoint;
use concepter_core::http::{FailureKind, HttpError, HttpRequest, HttpResponse};

use super::client::{Middleware, Next};
use crate::session::AuthSession;
use crate::state::StateStore;

pub struct FailureRecovery {
    session: Arc<dyn AuthSession>,
    state: StateStore,
}

impl FailureRecovery {
    pub fn new(session: Arc<dyn AuthSession>, state: StateStore) -> Self {
        Self { session, state }
    }

    async fn reauthenticate_and_replay(
        &self,
        original: HttpRequest,
        error: HttpError,
        next: Next<'_>,
    ) -> Result<HttpResponse, HttpError> {
        tracing::info!(
            "[Recovery] {} {} was unauthorized, refreshing session",
            original.method,
            original.url
        );

        // Concurrent 401s each refresh on their own.
        let refreshed = self
            .session
            .refresh_token()
            .await
            .filter(|credential| !credential.access_token.is_empty());

        let Some(credential) = refreshed else {
            tracing::warn!("[Recovery] Refresh failed, ending session");
            self.session.logout().await;
            return Err(error);
        };

        let token = self
            .session
            .token()
            .filter(|t| !t.is_empty())
            .unwrap_or(credential.access_token);
        let replay = original.with_bearer(&token)?;

        tracing::debug!("[Recovery] Replaying {} {}", replay.method, replay.url);
        next.run(replay).await
    }
}

#[async_trait]
impl Middleware for FailureRecovery {
    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> Result<HttpResponse, HttpError> {
        let original = request.clone();
        let error = match next.run(request).await {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        let kind = FailureKind::classify(error.status(), is_auth_endpoint(&original.url));
        if kind == FailureKind::Authentication {
            return self.reauthenticate_and_replay(original, error, next).await;
        }

        if let Some(message) = kind.user_message() {
            tracing::debug!("[Recovery] {:?} failure on {}", kind, original.url);
            self.state.set_error(Some(message.to_string()));
        }
        Err(error)
    }
}
