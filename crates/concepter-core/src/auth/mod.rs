//! Authentication models, endpoint allowlist and token expiry evaluation.

pub mod endpoints;
pub mod model;
pub mod token;

pub use endpoints::{is_auth_endpoint, LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH, REGISTER_PATH};
pub use model::{Credential, LoginRequest, RefreshRequest, RegisterRequest};
pub use token::{
    is_synthetic_token, is_token_expired, is_token_expired_at, token_expires_at,
    SYNTHETIC_TOKEN_PREFIX,
};
