//! Explicit wiring of the client services.

use std::sync::Arc;
use std::time::Duration;

use concepter_core::concept::ConceptFetcher;
use concepter_core::config::ClientConfig;
use concepter_core::http::HttpTransport;
use concepter_core::navigation::Navigator;
use concepter_infrastructure::storage::PersistentStore;

use crate::concept_service::ConceptService;
use crate::http::{ApiClient, FailureRecovery, RequestAuthenticator};
use crate::profile_service::ProfileService;
use crate::session::{AuthSession, SessionManager};
use crate::state::StateStore;

/// The single set of services shared by the whole process.
///
/// Built once at startup and handed to every consumer; there is no global
/// lookup.
pub struct ConcepterContext {
    pub state: StateStore,
    pub session: Arc<SessionManager>,
    /// Client for resource endpoints: authenticated, with failure recovery.
    pub api: ApiClient,
    pub concepts: Arc<ConceptService>,
    pub profile: ProfileService,
}

impl ConcepterContext {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        storage: PersistentStore,
        navigator: Arc<dyn Navigator>,
        logout_timeout: Duration,
    ) -> Self {
        let state = StateStore::new();

        let auth_api = ApiClient::new(base_url, transport.clone());
        let session = Arc::new(
            SessionManager::new(auth_api, storage, state.clone(), navigator)
                .with_logout_timeout(logout_timeout),
        );

        let auth_session: Arc<dyn AuthSession> = session.clone();
        let api = ApiClient::new(base_url, transport)
            .with_middleware(Arc::new(RequestAuthenticator::new(auth_session.clone())))
            .with_middleware(Arc::new(FailureRecovery::new(auth_session, state.clone())));

        let concepts = Arc::new(ConceptService::new(api.clone(), state.clone()));
        let fetcher: Arc<dyn ConceptFetcher> = concepts.clone();
        state.attach_concept_fetcher(&fetcher);

        let profile = ProfileService::new(api.clone(), session.clone());

        tracing::debug!("[Context] Services wired against {}", base_url);
        Self {
            state,
            session,
            api,
            concepts,
            profile,
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        storage: PersistentStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(
            &config.api_url,
            transport,
            storage,
            navigator,
            Duration::from_secs(config.logout_timeout_secs),
        )
    }
}
