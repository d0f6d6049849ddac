use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use concepter_core::auth::{
    Credential, LOGIN_PATH, LOGOUT_PATH, LoginRequest, REFRESH_PATH, REGISTER_PATH,
    RefreshRequest, RegisterRequest, is_token_expired,
};
use concepter_core::error::Result;
use concepter_core::http::HttpRequest;
use concepter_core::navigation::{Navigator, UNAUTHENTICATED_ROUTE};
use concepter_core::user::User;
use concepter_infrastructure::storage::PersistentStore;
use serde::Serialize;
use serde_json::json;
use tokio::sync::watch;

use super::AuthSession;
use crate::http::ApiClient;
use crate::state::{AUTH_LOADING_KEY, LOGIN_LOADING_KEY, StateStore};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const CURRENT_USER_KEY: &str = "current_user";

const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";
const REGISTER_FAILED_MESSAGE: &str = "Registration failed. Please try again.";
const DEFAULT_LOGOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the authentication lifecycle.
///
/// `SessionManager` is responsible for:
/// - Logging in, registering and logging out
/// - Refreshing the access token
/// - Mirroring the credential into persistent storage (three separate keys)
/// - Publishing the current user and the authenticated flag
///
/// Whether the session is authenticated is always derived from the persisted
/// token, so a restarted process reaches the same conclusion.
pub struct SessionManager {
    /// Client for the auth endpoints. Carries no middleware: a failing auth
    /// call must never re-enter the recovery flow.
    api: ApiClient,
    storage: PersistentStore,
    state: StateStore,
    navigator: Arc<dyn Navigator>,
    authenticated: watch::Sender<bool>,
    logout_timeout: Duration,
}

impl SessionManager {
    /// Creates the manager and reconciles it with whatever is persisted.
    ///
    /// A stored user with a valid token restores the session; anything else
    /// clears the stored keys (without contacting the server).
    pub fn new(
        api: ApiClient,
        storage: PersistentStore,
        state: StateStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (authenticated, _) = watch::channel(false);
        let manager = Self {
            api,
            storage,
            state,
            navigator,
            authenticated,
            logout_timeout: DEFAULT_LOGOUT_TIMEOUT,
        };
        manager.restore_session();
        manager
    }

    /// Bounds the best-effort logout notification.
    pub fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    fn restore_session(&self) {
        let user = self.current_user();
        match user {
            Some(user) if self.is_authenticated() => {
                tracing::info!("[Session] Restored session for {}", user.email);
                self.state.set_user(Some(user));
                self.authenticated.send_replace(true);
            }
            _ => {
                tracing::debug!("[Session] No valid stored session");
                self.clear_local_session();
            }
        }
    }

    // ============================================================================
    // Auth operations
    // ============================================================================

    pub async fn login(&self, email: &str, password: &str) -> Result<Credential> {
        tracing::info!("[Auth] Logging in as {}", email);
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate(LOGIN_PATH, &request, LOGIN_LOADING_KEY, LOGIN_FAILED_MESSAGE)
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Credential> {
        tracing::info!("[Auth] Registering {}", request.email);
        self.authenticate(REGISTER_PATH, request, AUTH_LOADING_KEY, REGISTER_FAILED_MESSAGE)
            .await
    }

    async fn authenticate<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        loading_key: &str,
        failure_message: &str,
    ) -> Result<Credential> {
        self.state.set_loading(loading_key, true);

        let outcome = match self.api.post::<Credential, _>(path, body).await {
            Ok(credential) => {
                self.handle_auth_success(&credential);
                Ok(credential)
            }
            Err(e) => {
                tracing::warn!("[Auth] {} failed: {}", path, e);
                self.state.set_error(Some(failure_message.to_string()));
                Err(e.into())
            }
        };

        self.state.set_loading(loading_key, false);
        outcome
    }

    /// Ends the session.
    ///
    /// The server is notified when a token is stored; that call is bounded
    /// by the logout timeout and its result ignored. Local cleanup and the
    /// redirect always happen.
    pub async fn logout(&self) {
        if let Some(token) = self.token().filter(|t| !t.is_empty()) {
            self.notify_logout(&token).await;
        }
        self.end_session_locally();
        tracing::info!("[Session] Logged out");
    }

    async fn notify_logout(&self, token: &str) {
        let request = match HttpRequest::post(self.api.url(LOGOUT_PATH), json!({})).with_bearer(token)
        {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("[Session] Skipping logout notification: {}", e);
                return;
            }
        };

        match tokio::time::timeout(self.logout_timeout, self.api.execute(request)).await {
            Ok(Ok(_)) => tracing::debug!("[Session] Server acknowledged logout"),
            Ok(Err(e)) => tracing::warn!("[Session] Logout notification failed: {}", e),
            Err(_) => tracing::warn!(
                "[Session] Logout notification timed out after {:?}",
                self.logout_timeout
            ),
        }
    }

    /// Exchanges the stored refresh token for a new credential.
    ///
    /// Never fails: a missing refresh token or a rejected refresh ends the
    /// session and yields `None`.
    pub async fn refresh_token(&self) -> Option<Credential> {
        let Some(refresh_token) = self
            .storage
            .get::<String>(REFRESH_TOKEN_KEY)
            .filter(|t| !t.is_empty())
        else {
            tracing::info!("[Session] No refresh token stored, ending session");
            self.end_session_locally();
            return None;
        };

        let request = RefreshRequest { refresh_token };
        match self.api.post::<Credential, _>(REFRESH_PATH, &request).await {
            Ok(credential) => {
                tracing::info!("[Session] Access token refreshed");
                self.handle_auth_success(&credential);
                Some(credential)
            }
            Err(e) => {
                tracing::warn!("[Session] Token refresh failed: {}", e);
                self.logout().await;
                None
            }
        }
    }

    // ============================================================================
    // Reads
    // ============================================================================

    pub fn current_user(&self) -> Option<User> {
        self.storage.get(CURRENT_USER_KEY)
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    /// `true` iff a token is stored and it has not expired.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|token| !is_token_expired(&token))
    }

    /// Observes the authenticated flag published on login, refresh and logout.
    pub fn subscribe_authenticated(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    /// Stores a user returned by a profile round trip.
    pub fn update_current_user(&self, user: User) {
        self.storage.set(CURRENT_USER_KEY, &user);
        self.state.set_user(Some(user));
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn handle_auth_success(&self, credential: &Credential) {
        self.storage.set(ACCESS_TOKEN_KEY, &credential.access_token);
        self.storage.set(REFRESH_TOKEN_KEY, &credential.refresh_token);
        self.storage.set(CURRENT_USER_KEY, &credential.issued_user);

        self.state.set_user(Some(credential.issued_user.clone()));
        self.authenticated.send_replace(true);
        self.state.set_error(None);

        tracing::info!(
            "[Session] Authenticated as {}",
            credential.issued_user.email
        );
    }

    fn clear_local_session(&self) {
        self.storage.remove(ACCESS_TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        self.storage.remove(CURRENT_USER_KEY);

        self.state.set_user(None);
        self.authenticated.send_replace(false);
        self.state.reset();
    }

    fn end_session_locally(&self) {
        self.clear_local_session();
        self.navigator.navigate(UNAUTHENTICATED_ROUTE);
    }
}

#[async_trait]
impl AuthSession for SessionManager {
    fn token(&self) -> Option<String> {
        SessionManager::token(self)
    }

    async fn refresh_token(&self) -> Option<Credential> {
        SessionManager::refresh_token(self).await
    }

    async fn logout(&self) {
        SessionManager::logout(self).await
    }
}
