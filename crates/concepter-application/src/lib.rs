//! Application layer for the Concepter client.
//!
//! This crate wires the session lifecycle, the shared state store and the
//! request pipeline on top of the domain and infrastructure layers.

pub mod concept_service;
pub mod context;
pub mod http;
pub mod profile_service;
pub mod session;
pub mod state;

pub use concept_service::ConceptService;
pub use context::ConcepterContext;
pub use http::{ApiClient, FailureRecovery, Middleware, Next, RequestAuthenticator};
pub use profile_service::ProfileService;
pub use session::{AuthSession, SessionManager};
pub use state::{ApplicationState, StateStore, Subscription};
