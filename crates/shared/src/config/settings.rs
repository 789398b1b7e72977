//! Typed, validated settings.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::keys;

/// A value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Connection settings for the S3-compatible object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStorageSettings {
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: Secret,
    pub(crate) bucket_name: String,
    pub(crate) endpoint_url: String,
    pub(crate) region: String,
    pub(crate) custom_domain: Option<String>,
}

impl RemoteStorageSettings {
    /// Access key id.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key.
    #[must_use]
    pub fn secret_access_key(&self) -> &Secret {
        &self.secret_access_key
    }

    /// Bucket name.
    #[must_use]
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Endpoint URL, e.g. `https://<account>.r2.cloudflarestorage.com`.
    #[must_use]
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Region (`auto` unless configured).
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Public domain serving the bucket, if any.
    #[must_use]
    pub fn custom_domain(&self) -> Option<&str> {
        self.custom_domain.as_deref()
    }
}

/// Timeout and retry knobs for storage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageTuning {
    /// Upper bound for a single remote request.
    pub request_timeout: Duration,
    /// Attempts per remote operation, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt.
    pub retry_base_delay: Duration,
}

impl Default for StorageTuning {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(keys::DEFAULT_TIMEOUT_SECS),
            max_attempts: keys::DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(keys::DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

/// Immutable deployment settings.
///
/// Only [`ConfigValidator`](super::ConfigValidator) can build one, so a value
/// of this type has passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub(crate) secret_key: Secret,
    pub(crate) debug: bool,
    pub(crate) allowed_hosts: BTreeSet<String>,
    pub(crate) database_url: Secret,
    pub(crate) media_root: PathBuf,
    pub(crate) media_url: String,
    pub(crate) remote_storage: Option<RemoteStorageSettings>,
    pub(crate) tuning: StorageTuning,
}

impl ValidatedConfig {
    /// Signing secret.
    #[must_use]
    pub fn secret_key(&self) -> &Secret {
        &self.secret_key
    }

    /// Development mode.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Exact hostnames the application serves.
    #[must_use]
    pub fn allowed_hosts(&self) -> &BTreeSet<String> {
        &self.allowed_hosts
    }

    /// Database URL, untouched.
    #[must_use]
    pub fn database_url(&self) -> &Secret {
        &self.database_url
    }

    /// Whether media lives in the remote object store.
    #[must_use]
    pub fn use_remote_storage(&self) -> bool {
        self.remote_storage.is_some()
    }

    /// Remote store settings when remote storage is enabled.
    #[must_use]
    pub fn remote_storage(&self) -> Option<&RemoteStorageSettings> {
        self.remote_storage.as_ref()
    }

    /// Local media directory.
    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Public URL prefix of the local media directory, ending in `/`.
    #[must_use]
    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// Timeout and retry settings.
    #[must_use]
    pub fn storage_tuning(&self) -> StorageTuning {
        self.tuning
    }
}
