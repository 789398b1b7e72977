//! Startup core for Homeschool Hub deployments.
//!
//! Everything here runs before the web application serves traffic, or
//! underneath it as the media store.
//!
//! # Modules
//!
//! - `storage` - Media storage contract with local and S3-compatible backends
//! - `host_guard` - Host-header safety check before binding
//! - `startup` - Validation, guard and storage wiring, plus reload

pub mod host_guard;
pub mod startup;
pub mod storage;

pub use host_guard::{HostSafetyGuard, HostViolation};
pub use startup::{AppContext, ContextHandle, StartupError, bootstrap};
pub use storage::{MediaStorage, StorageBackend, StorageBackendFactory, StorageError, StorageKey};
