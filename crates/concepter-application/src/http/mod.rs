//! Request pipeline: the API client and its middlewares.

mod authenticator;
mod client;
mod recovery;

pub use authenticator::RequestAuthenticator;
pub use client::{ApiClient, Middleware, Next};
pub use recovery::FailureRecovery;
