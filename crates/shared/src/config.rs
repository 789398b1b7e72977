//! Deployment configuration: reading, validation and typed settings.
//!
//! ```text
//! ConfigSource ──► RawConfig ──► ConfigValidator ──► ValidatedConfig
//!                                       │
//!                                       └──► ValidationError (every violation)
//! ```

mod error;
mod hosts;
pub mod keys;
mod raw;
mod settings;
mod source;
mod validator;

pub use error::{ConfigSourceError, ValidationError, Violation};
pub use hosts::{is_wildcard_host, split_hosts};
pub use raw::RawConfig;
pub use settings::{RemoteStorageSettings, Secret, StorageTuning, ValidatedConfig};
pub use source::{ConfigSource, RUN_MODE};
pub use validator::ConfigValidator;
