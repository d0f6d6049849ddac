//! Domain layer for the Concepter client.
//!
//! Models, the shared error type, token evaluation and the seams (transport,
//! storage medium, concept fetching, navigation) the outer layers plug into.

pub mod auth;
pub mod chat;
pub mod concept;
pub mod config;
pub mod error;
pub mod http;
pub mod navigation;
pub mod storage;
pub mod user;

// Re-export common error type
pub use error::{ConcepterError, Result};
