//! Media storage in an S3-compatible object store, via Apache OpenDAL.

use std::time::Duration;

use bytes::Bytes;
use opendal::layers::TimeoutLayer;
use opendal::{Operator, services};

use hub_shared::config::{RemoteStorageSettings, StorageTuning};

use super::backend::{StorageBackend, StoredObject};
use super::error::StorageError;
use super::key::StorageKey;
use super::retry::RetryPolicy;

/// Stores objects in a bucket of an S3-compatible service (AWS S3,
/// Cloudflare R2, MinIO).
///
/// Construction performs no network I/O. Every operation is bounded by the
/// configured request timeout and transport failures are retried according to
/// the [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RemoteObjectStore {
    operator: Operator,
    public_base: String,
    retry: RetryPolicy,
}

impl RemoteObjectStore {
    /// Build a store for the configured bucket.
    pub fn new(
        settings: &RemoteStorageSettings,
        tuning: StorageTuning,
    ) -> Result<Self, StorageError> {
        let builder = services::S3::default()
            .endpoint(settings.endpoint_url())
            .bucket(settings.bucket_name())
            .region(settings.region())
            .access_key_id(settings.access_key_id())
            .secret_access_key(settings.secret_access_key().expose())
            .disable_config_load();

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .layer(timeout_layer(tuning.request_timeout))
            .finish();

        Ok(Self::with_operator(
            operator,
            public_base(settings),
            RetryPolicy::from(tuning),
        ))
    }

    /// Wrap an existing operator.
    ///
    /// `public_base` is the URL prefix objects are served from, without a
    /// trailing slash.
    #[must_use]
    pub fn with_operator(operator: Operator, public_base: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            operator,
            public_base: public_base.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// Retry policy in effect.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}

impl StorageBackend for RemoteObjectStore {
    async fn put(&self, key: &StorageKey, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.retry
            .run("put", move || {
                // `Bytes` clones share the buffer; nothing is copied per attempt.
                let body = data.clone();
                async move {
                    self.operator
                        .write_with(key.as_str(), body)
                        .content_type(content_type)
                        .await
                        .map(|_| ())
                        .map_err(|e| StorageError::from_operator(key, &e))
                }
            })
            .await
    }

    async fn get(&self, key: &StorageKey) -> Result<Bytes, StorageError> {
        self.retry
            .run("get", move || async move {
                self.operator
                    .read(key.as_str())
                    .await
                    .map(|buffer| buffer.to_bytes())
                    .map_err(|e| StorageError::from_operator(key, &e))
            })
            .await
    }

    /// Removes the object at `key`, failing with `NotFound` if it is absent.
    ///
    /// S3 `DELETE` succeeds for missing keys, so this issues a `HEAD` first
    /// and then the `DELETE`: two requests, each retried on its own. The pair
    /// is not atomic. An object created between them is deleted, and one
    /// removed by another client between them still reports success.
    async fn delete(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.stat(key).await?;
        self.retry
            .run("delete", move || async move {
                self.operator
                    .delete(key.as_str())
                    .await
                    .map_err(|e| StorageError::from_operator(key, &e))
            })
            .await
    }

    async fn stat(&self, key: &StorageKey) -> Result<StoredObject, StorageError> {
        let metadata = self
            .retry
            .run("stat", move || async move {
                self.operator
                    .stat(key.as_str())
                    .await
                    .map_err(|e| StorageError::from_operator(key, &e))
            })
            .await?;

        Ok(StoredObject {
            key: key.clone(),
            size: metadata.content_length(),
            content_type: metadata.content_type().map(String::from),
        })
    }

    fn public_url(&self, key: &StorageKey) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::new()
        .with_timeout(timeout)
        .with_io_timeout(timeout)
}

/// Public URL prefix for objects in the configured bucket.
///
/// A custom domain wins over the path-style endpoint address.
fn public_base(settings: &RemoteStorageSettings) -> String {
    match settings.custom_domain() {
        Some(domain) => format!("https://{domain}"),
        None => format!(
            "{}/{}",
            settings.endpoint_url().trim_end_matches('/'),
            settings.bucket_name()
        ),
    }
}
