//! Builds the media backend selected by configuration.

use hub_shared::ValidatedConfig;
use tracing::info;

use super::backend::MediaStorage;
use super::config::StorageProvider;
use super::error::StorageError;
use super::local::LocalFilesystemStore;
use super::remote::RemoteObjectStore;

/// Constructs exactly one [`MediaStorage`] from validated settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageBackendFactory;

impl StorageBackendFactory {
    /// Build the backend for `config`.
    ///
    /// Performs no network I/O.
    pub fn build(config: &ValidatedConfig) -> Result<MediaStorage, StorageError> {
        Self::from_provider(StorageProvider::from_config(config))
    }

    /// Build the backend for an explicit provider.
    pub fn from_provider(provider: StorageProvider) -> Result<MediaStorage, StorageError> {
        let name = provider.name();
        let location = provider.location();

        let storage = match provider {
            StorageProvider::S3 { settings, tuning } => {
                MediaStorage::Remote(RemoteObjectStore::new(&settings, tuning)?)
            }
            StorageProvider::LocalFs { root, base_url } => {
                MediaStorage::Local(LocalFilesystemStore::new(root, base_url))
            }
        };

        info!(provider = name, location = %location, "media storage configured");
        Ok(storage)
    }
}
