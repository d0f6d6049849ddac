//! Concepts resource client.
//!
//! Every successful call is mirrored into the shared state so subscribers see
//! the same collection the server holds.

use async_trait::async_trait;
use concepter_core::concept::{
    Concept, ConceptFetcher, ConceptFilters, ConceptPage, ConceptStatus, CreateConceptRequest,
    UpdateConceptRequest,
};
use concepter_core::error::Result;

use crate::http::ApiClient;
use crate::state::StateStore;

const CONCEPTS_PATH: &str = "/api/concepts";

pub struct ConceptService {
    api: ApiClient,
    state: StateStore,
}

impl ConceptService {
    pub fn new(api: ApiClient, state: StateStore) -> Self {
        Self { api, state }
    }

    /// Lists one page of concepts.
    pub async fn list(&self, filters: &ConceptFilters) -> Result<ConceptPage> {
        let page: ConceptPage = self.api.get(CONCEPTS_PATH, &filters.to_query()).await?;
        tracing::debug!(
            "[Concepts] Listed {} of {} concepts",
            page.content.len(),
            page.total_elements
        );
        Ok(page)
    }

    /// Fetches a concept and makes it the current one.
    pub async fn get(&self, id: &str) -> Result<Concept> {
        let concept: Concept = self.api.get_item(CONCEPTS_PATH, id).await?;
        self.state.set_current_concept(Some(concept.clone()));
        Ok(concept)
    }

    pub async fn create(&self, request: &CreateConceptRequest) -> Result<Concept> {
        let concept: Concept = self.api.post(CONCEPTS_PATH, request).await?;
        tracing::info!("[Concepts] Created {}", concept.id);
        self.state.add_concept(concept.clone());
        Ok(concept)
    }

    pub async fn update(&self, id: &str, request: &UpdateConceptRequest) -> Result<Concept> {
        let concept: Concept = self.api.put_item(CONCEPTS_PATH, id, request).await?;
        self.state.update_concept(concept.clone());
        Ok(concept)
    }

    /// Deletes a concept. The server archives it unless `permanent` is set.
    pub async fn delete(&self, id: &str, permanent: bool) -> Result<()> {
        let query = if permanent {
            vec![("permanent", "true".to_string())]
        } else {
            Vec::new()
        };
        self.api.delete_item(CONCEPTS_PATH, id, &query).await?;
        tracing::info!("[Concepts] Deleted {} (permanent: {})", id, permanent);
        self.state.remove_concept(id);
        Ok(())
    }

    pub async fn set_status(&self, id: &str, status: ConceptStatus) -> Result<Concept> {
        let request = UpdateConceptRequest {
            status: Some(status),
            ..Default::default()
        };
        self.update(id, &request).await
    }

    pub async fn archive(&self, id: &str) -> Result<Concept> {
        self.set_status(id, ConceptStatus::Archived).await
    }

    pub async fn unarchive(&self, id: &str) -> Result<Concept> {
        self.set_status(id, ConceptStatus::Draft).await
    }
}

#[async_trait]
impl ConceptFetcher for ConceptService {
    async fn fetch_concepts(&self) -> Result<Vec<Concept>> {
        Ok(self.list(&ConceptFilters::default()).await?.content)
    }
}
