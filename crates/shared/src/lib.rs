//! Shared configuration types for Homeschool Hub deployments.
//!
//! This crate turns the process environment into a validated, immutable
//! settings value:
//! - Layered raw configuration (config files + environment)
//! - Aggregated validation of production-safety rules
//! - Typed settings consumed by the storage and startup code

pub mod config;

pub use config::{
    ConfigSource, ConfigValidator, RawConfig, ValidatedConfig, ValidationError, Violation,
};
