//! Host-header safety check run just before the application binds.
//!
//! The validator already enforces the same rules; this is a second,
//! independent gate.

use hub_shared::ValidatedConfig;
use hub_shared::config::is_wildcard_host;
use thiserror::Error;

/// Why the host configuration is unsafe to serve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostViolation {
    /// Production mode with nothing allowed.
    #[error("refusing to serve: ALLOWED_HOSTS is empty outside debug mode")]
    EmptyAllowedHosts,

    /// Production mode with a wildcard entry.
    #[error("refusing to serve: wildcard host '{0}' outside debug mode")]
    WildcardHost(String),
}

/// Rejects unsafe host configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSafetyGuard;

impl HostSafetyGuard {
    /// Check validated settings.
    pub fn check(config: &ValidatedConfig) -> Result<(), HostViolation> {
        Self::check_hosts(
            config.debug(),
            config.allowed_hosts().iter().map(String::as_str),
        )
    }

    /// Check a debug flag and host list directly.
    pub fn check_hosts<'a>(
        debug: bool,
        hosts: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), HostViolation> {
        if debug {
            return Ok(());
        }

        let mut any = false;
        for host in hosts {
            if is_wildcard_host(host) {
                return Err(HostViolation::WildcardHost(host.to_string()));
            }
            any = true;
        }
        if any {
            Ok(())
        } else {
            Err(HostViolation::EmptyAllowedHosts)
        }
    }
}
