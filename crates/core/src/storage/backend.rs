//! The storage contract shared by every backend.

use std::future::Future;

use bytes::Bytes;

use super::error::StorageError;
use super::key::StorageKey;
use super::local::LocalFilesystemStore;
use super::remote::RemoteObjectStore;

/// Description of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object key.
    pub key: StorageKey,
    /// Size in bytes.
    pub size: u64,
    /// Content type, when the backend records one.
    pub content_type: Option<String>,
}

/// Uniform media storage operations.
///
/// Implementations are safe to share between tasks.
pub trait StorageBackend: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Read the object at `key`.
    fn get(&self, key: &StorageKey) -> impl Future<Output = Result<Bytes, StorageError>> + Send;

    /// Remove the object at `key`. Fails with `NotFound` if it does not exist.
    fn delete(&self, key: &StorageKey) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Size and content type of the object at `key`.
    fn stat(
        &self,
        key: &StorageKey,
    ) -> impl Future<Output = Result<StoredObject, StorageError>> + Send;

    /// Whether an object exists at `key`.
    fn exists(&self, key: &StorageKey) -> impl Future<Output = Result<bool, StorageError>> + Send {
        async move {
            match self.stat(key).await {
                Ok(_) => Ok(true),
                Err(err) if err.is_not_found() => Ok(false),
                Err(err) => Err(err),
            }
        }
    }

    /// Public address of `key`. Pure: no I/O.
    fn public_url(&self, key: &StorageKey) -> String;
}

/// The media backend selected at startup.
///
/// Callers use it through [`StorageBackend`] and never match on the variant.
#[derive(Debug, Clone)]
pub enum MediaStorage {
    /// Local media directory.
    Local(LocalFilesystemStore),
    /// S3-compatible object store.
    Remote(RemoteObjectStore),
}

impl MediaStorage {
    /// Backend name for logs.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "s3",
        }
    }
}

impl StorageBackend for MediaStorage {
    async fn put(&self, key: &StorageKey, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        match self {
            Self::Local(store) => store.put(key, data, content_type).await,
            Self::Remote(store) => store.put(key, data, content_type).await,
        }
    }

    async fn get(&self, key: &StorageKey) -> Result<Bytes, StorageError> {
        match self {
            Self::Local(store) => store.get(key).await,
            Self::Remote(store) => store.get(key).await,
        }
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), StorageError> {
        match self {
            Self::Local(store) => store.delete(key).await,
            Self::Remote(store) => store.delete(key).await,
        }
    }

    async fn stat(&self, key: &StorageKey) -> Result<StoredObject, StorageError> {
        match self {
            Self::Local(store) => store.stat(key).await,
            Self::Remote(store) => store.stat(key).await,
        }
    }

    fn public_url(&self, key: &StorageKey) -> String {
        match self {
            Self::Local(store) => store.public_url(key),
            Self::Remote(store) => store.public_url(key),
        }
    }
}
