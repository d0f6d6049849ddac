use std::collections::HashMap;

use concepter_core::chat::ChatMessage;
use concepter_core::concept::Concept;
use concepter_core::user::User;

/// Loading key set while the concepts collection is being fetched.
pub const CONCEPTS_LOADING_KEY: &str = "concepts";
/// Loading key set while a login is in flight.
pub const LOGIN_LOADING_KEY: &str = "login";
/// Loading key set while a registration is in flight.
pub const AUTH_LOADING_KEY: &str = "auth";

/// Process-wide client state.
///
/// Never mutated in place once published: every change produces a new
/// snapshot, so a subscriber holding an older `Arc<ApplicationState>` keeps
/// seeing exactly what it was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationState {
    pub user: Option<User>,
    pub concepts: Vec<Concept>,
    pub concepts_loaded: bool,
    pub current_concept: Option<Concept>,
    pub chat_messages: Vec<ChatMessage>,
    pub loading: HashMap<String, bool>,
    pub error: Option<String>,
}

impl ApplicationState {
    /// Returns the named loading flag, `false` when never set.
    pub fn is_loading(&self, key: &str) -> bool {
        self.loading.get(key).copied().unwrap_or(false)
    }
}
