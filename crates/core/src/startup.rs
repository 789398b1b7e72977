//! Process-start wiring: validate, guard, build storage.

use std::sync::Arc;

use arc_swap::ArcSwap;
use hub_shared::{ConfigValidator, RawConfig, ValidatedConfig, ValidationError};
use thiserror::Error;
use tracing::{info, warn};

use crate::host_guard::{HostSafetyGuard, HostViolation};
use crate::storage::{MediaStorage, StorageBackendFactory, StorageError};

/// Why the application must not start.
#[derive(Debug, Error)]
pub enum StartupError {
    /// One or more configuration violations.
    #[error(transparent)]
    Config(#[from] ValidationError),

    /// Host-header configuration is unsafe.
    #[error(transparent)]
    HostSafety(#[from] HostViolation),

    /// The storage backend could not be built.
    #[error("failed to build media storage: {0}")]
    Storage(#[from] StorageError),
}

/// Settings and storage the host application runs with.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Arc<ValidatedConfig>,
    storage: Arc<MediaStorage>,
}

impl AppContext {
    /// Validated settings.
    #[must_use]
    pub fn config(&self) -> &Arc<ValidatedConfig> {
        &self.config
    }

    /// Media backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<MediaStorage> {
        &self.storage
    }
}

/// Runs the startup sequence on `raw`.
///
/// Storage is never built from settings that failed validation or the host
/// safety check.
pub fn bootstrap(raw: &RawConfig) -> Result<AppContext, StartupError> {
    let config = ConfigValidator::validate(raw)?;
    HostSafetyGuard::check(&config)?;
    let storage = StorageBackendFactory::build(&config)?;

    info!(
        debug = config.debug(),
        hosts = config.allowed_hosts().len(),
        storage = storage.provider_name(),
        "startup checks passed"
    );

    Ok(AppContext {
        config: Arc::new(config),
        storage: Arc::new(storage),
    })
}

/// Shared handle to the current [`AppContext`].
///
/// Reloads build a fresh context and swap it in atomically; callers holding
/// the previous one keep using it until they drop it.
#[derive(Debug)]
pub struct ContextHandle {
    current: ArcSwap<AppContext>,
}

impl ContextHandle {
    /// Handle starting at `context`.
    #[must_use]
    pub fn new(context: AppContext) -> Self {
        Self {
            current: ArcSwap::from_pointee(context),
        }
    }

    /// Current context.
    #[must_use]
    pub fn load(&self) -> Arc<AppContext> {
        self.current.load_full()
    }

    /// Rebuild from `raw` and swap in the result.
    ///
    /// On failure the current context stays in place.
    pub fn reload(&self, raw: &RawConfig) -> Result<Arc<AppContext>, StartupError> {
        match bootstrap(raw) {
            Ok(context) => {
                let context = Arc::new(context);
                self.current.store(Arc::clone(&context));
                info!("configuration reloaded");
                Ok(context)
            }
            Err(err) => {
                warn!(error = %err, "configuration reload rejected, keeping current settings");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use hub_shared::config::keys::{
        ALLOWED_HOSTS, DATABASE_URL, DEBUG, MEDIA_URL, REMOTE_BUCKET_NAME, SECRET_KEY,
        USE_REMOTE_STORAGE,
    };

    use super::*;

    fn production() -> RawConfig {
        RawConfig::new()
            .with(DEBUG, "false")
            .with(ALLOWED_HOSTS, "app.example.com")
            .with(SECRET_KEY, "a-sufficiently-long-random-value")
            .with(DATABASE_URL, "postgres://hub@db/hub")
            .with(USE_REMOTE_STORAGE, "false")
    }

    #[test]
    fn test_bootstrap_production_local() {
        let context = bootstrap(&production()).expect("starts");
        assert!(!context.config().debug());
        assert!(matches!(context.storage().as_ref(), MediaStorage::Local(_)));
    }

    #[test]
    fn test_bootstrap_stops_at_config_errors() {
        let raw = production()
            .with(USE_REMOTE_STORAGE, "true")
            .with(REMOTE_BUCKET_NAME, "hub-media");

        let err = bootstrap(&raw).expect_err("must not start");

        let StartupError::Config(err) = err else {
            panic!("expected configuration error, got {err:?}");
        };
        assert_eq!(err.len(), 3);
    }

    #[test]
    fn test_reload_swaps_context() {
        let handle = ContextHandle::new(bootstrap(&production()).expect("starts"));
        let before = handle.load();

        let reloaded = handle
            .reload(&production().with(MEDIA_URL, "/uploads/"))
            .expect("reloads");

        assert_eq!(before.config().media_url(), "/media/");
        assert_eq!(reloaded.config().media_url(), "/uploads/");
        assert_eq!(handle.load().config().media_url(), "/uploads/");
    }

    #[test]
    fn test_failed_reload_keeps_current_context() {
        let handle = ContextHandle::new(bootstrap(&production()).expect("starts"));

        let err = handle
            .reload(&production().with(ALLOWED_HOSTS, "*"))
            .expect_err("rejected");

        assert!(matches!(err, StartupError::Config(_)));
        assert_eq!(
            handle.load().config().allowed_hosts().iter().collect::<Vec<_>>(),
            vec!["app.example.com"]
        );
    }
}
