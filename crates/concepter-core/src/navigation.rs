//! Redirect seam between the session layer and whatever presents it.

/// Route of the unauthenticated entry point.
pub const UNAUTHENTICATED_ROUTE: &str = "/auth/login";

/// Moves the user to another screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!("[Navigation] Redirecting to {}", route);
    }
}
