//! Shared application state and its subscriptions.

pub mod model;
pub mod store;
mod subscription;

pub use model::{
    AUTH_LOADING_KEY, ApplicationState, CONCEPTS_LOADING_KEY, LOGIN_LOADING_KEY,
};
pub use store::StateStore;
pub use subscription::Subscription;
