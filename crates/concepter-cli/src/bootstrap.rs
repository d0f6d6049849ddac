//! Process startup: configuration, logging and service wiring.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use concepter_application::ConcepterContext;
use concepter_core::config::ClientConfig;
use concepter_core::navigation::LoggingNavigator;
use concepter_core::storage::StorageMedium;
use concepter_infrastructure::storage::{JsonFileMedium, MemoryMedium, PersistentStore};
use concepter_infrastructure::{ConfigService, ReqwestTransport};
use tracing_subscriber::EnvFilter;

pub fn load_config(api_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = ConfigService::load().context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.api_url = url.to_string();
        config = config.normalized().context("Invalid --api-url")?;
    }
    Ok(config)
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the configured
/// filter.
pub fn init_tracing(configured_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(configured_filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn build_context(config: &ClientConfig, ephemeral: bool) -> Result<ConcepterContext> {
    let medium: Arc<dyn StorageMedium> = if ephemeral {
        tracing::debug!("[Storage] Using in-memory storage");
        Arc::new(MemoryMedium::new())
    } else {
        let path = ConfigService::storage_file(config)?;
        tracing::debug!("[Storage] Using {}", path.display());
        Arc::new(JsonFileMedium::new(path))
    };

    let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))
        .context("Failed to create HTTP client")?;

    Ok(ConcepterContext::from_config(
        config,
        Arc::new(transport),
        PersistentStore::new(medium),
        Arc::new(LoggingNavigator),
    ))
}
