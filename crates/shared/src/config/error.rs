//! Configuration error types.

use std::fmt;

use thiserror::Error;

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// A required key is absent or blank.
    #[error("{key} is required")]
    MissingRequired {
        /// Environment key.
        key: String,
    },

    /// A value could not be parsed.
    #[error("{key} is invalid: {reason}")]
    InvalidFormat {
        /// Environment key.
        key: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// An allowed-hosts entry matches more than one hostname.
    #[error("wildcard host '{entry}' is not permitted in ALLOWED_HOSTS")]
    WildcardHost {
        /// The offending entry.
        entry: String,
    },

    /// The secret key is unsafe for production.
    #[error("SECRET_KEY is too weak for production: {reason}")]
    WeakSecret {
        /// Why the secret was rejected.
        reason: String,
    },
}

impl Violation {
    /// Create a missing required key violation.
    #[must_use]
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingRequired { key: key.into() }
    }

    /// Create an invalid format violation.
    #[must_use]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a wildcard host violation.
    #[must_use]
    pub fn wildcard(entry: impl Into<String>) -> Self {
        Self::WildcardHost {
            entry: entry.into(),
        }
    }

    /// Create a weak secret violation.
    #[must_use]
    pub fn weak_secret(reason: impl Into<String>) -> Self {
        Self::WeakSecret {
            reason: reason.into(),
        }
    }

    /// The environment key this violation refers to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::MissingRequired { key } | Self::InvalidFormat { key, .. } => key,
            Self::WildcardHost { .. } => super::keys::ALLOWED_HOSTS,
            Self::WeakSecret { .. } => super::keys::SECRET_KEY,
        }
    }
}

/// Every violation found in one validation pass, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { violations }
    }

    /// All violations.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always false for an error produced by the validator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether a `MissingRequired` violation names `key`.
    #[must_use]
    pub fn is_missing(&self, key: &str) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::MissingRequired { key: k } if k == key))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "configuration has {} problem(s):",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl IntoIterator for ValidationError {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

/// Failure to read raw configuration.
#[derive(Debug, Error)]
pub enum ConfigSourceError {
    /// A config file or the environment could not be read.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
