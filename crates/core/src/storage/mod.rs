//! Media storage behind one contract.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 StorageBackend (MediaStorage)                    │
//! │   put(key, bytes, type) · get(key) · delete(key) · public_url   │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │ LocalFilesystemStore           │ RemoteObjectStore              │
//! │ tokio::fs, write + rename      │ Apache OpenDAL S3 service      │
//! │                                │ timeout layer + RetryPolicy    │
//! └────────────────────────────────┴────────────────────────────────┘
//! ```
//!
//! [`StorageBackendFactory`] picks the backend once, from validated settings.

mod backend;
mod config;
mod error;
mod factory;
mod key;
mod local;
mod remote;
mod retry;

pub use backend::{MediaStorage, StorageBackend, StoredObject};
pub use config::StorageProvider;
pub use error::StorageError;
pub use factory::StorageBackendFactory;
pub use key::StorageKey;
pub use local::LocalFilesystemStore;
pub use remote::RemoteObjectStore;
pub use retry::RetryPolicy;
