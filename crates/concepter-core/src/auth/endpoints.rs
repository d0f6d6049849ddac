//! Authentication resource paths.

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Paths that must never carry a bearer credential and never trigger a
/// refresh-and-replay.
pub const AUTH_ENDPOINTS: [&str; 3] = [LOGIN_PATH, REGISTER_PATH, REFRESH_PATH];

/// Returns true if `url` targets login, register or refresh.
///
/// Matching is by containment, so prefixed (`/api/auth/login`) and nested
/// (`/auth/refresh/rotate`) paths are covered as well.
pub fn is_auth_endpoint(url: &str) -> bool {
    AUTH_ENDPOINTS.iter().any(|path| url.contains(path))
}
