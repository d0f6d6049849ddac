//! Session and authentication lifecycle.
//!
//! `SessionManager` owns the persisted credential and the current user. The
//! HTTP middlewares only see it through [`AuthSession`].

mod manager;

use async_trait::async_trait;
use concepter_core::auth::Credential;

pub use manager::{ACCESS_TOKEN_KEY, CURRENT_USER_KEY, REFRESH_TOKEN_KEY, SessionManager};

/// The part of the session the request pipeline depends on.
#[async_trait]
pub trait AuthSession: Send + Sync {
    /// The persisted access token, if any.
    fn token(&self) -> Option<String>;

    /// Exchanges the refresh token for a new credential. `None` means the
    /// session has been torn down.
    async fn refresh_token(&self) -> Option<Credential>;

    /// Ends the session locally, notifying the server on a best-effort basis.
    async fn logout(&self);
}
