pub mod model;

use async_trait::async_trait;

use crate::error::Result;

pub use model::{
    Concept, ConceptFilters, ConceptPage, ConceptStatus, CreateConceptRequest,
    UpdateConceptRequest,
};

/// Narrow fetch contract the state store uses to lazily load the concepts
/// collection.
#[async_trait]
pub trait ConceptFetcher: Send + Sync {
    async fn fetch_concepts(&self) -> Result<Vec<Concept>>;
}
