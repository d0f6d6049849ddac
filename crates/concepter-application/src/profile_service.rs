use std::sync::Arc;

use concepter_core::error::Result;
use concepter_core::user::{UpdateUserRequest, User};

use crate::http::ApiClient;
use crate::session::SessionManager;

const PROFILE_PATH: &str = "/api/users/profile";

/// Round trips the signed-in user's profile and keeps the stored copy current.
pub struct ProfileService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl ProfileService {
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    pub async fn get_profile(&self) -> Result<User> {
        let user: User = self.api.get(PROFILE_PATH, &[]).await?;
        self.session.update_current_user(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, request: &UpdateUserRequest) -> Result<User> {
        let user: User = self.api.put(PROFILE_PATH, request).await?;
        tracing::info!("[Profile] Updated profile for {}", user.email);
        self.session.update_current_user(user.clone());
        Ok(user)
    }
}
