//! Storage provider selection.

use std::path::PathBuf;

use hub_shared::ValidatedConfig;
use hub_shared::config::{RemoteStorageSettings, StorageTuning};

/// Which backend to build and with what parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, AWS S3, MinIO.
    S3 {
        /// Connection settings.
        settings: RemoteStorageSettings,
        /// Timeout and retry knobs.
        tuning: StorageTuning,
    },
    /// Local media directory.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
        /// Public URL prefix.
        base_url: String,
    },
}

impl StorageProvider {
    /// Provider described by validated settings.
    #[must_use]
    pub fn from_config(config: &ValidatedConfig) -> Self {
        match config.remote_storage() {
            Some(settings) => Self::S3 {
                settings: settings.clone(),
                tuning: config.storage_tuning(),
            },
            None => Self::local_fs(config.media_root(), config.media_url()),
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self::LocalFs {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Get the bucket name or root directory.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::S3 { settings, .. } => settings.bucket_name().to_string(),
            Self::LocalFs { root, .. } => root.display().to_string(),
        }
    }
}
