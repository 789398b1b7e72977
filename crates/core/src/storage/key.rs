//! Object keys.

use std::fmt;

use super::error::StorageError;

/// Relative, slash-separated object name such as `students/42/avatar.png`.
///
/// Rejected at construction:
/// - empty keys and empty segments (`a//b`)
/// - `.` and `..` segments, leading `/`
/// - backslashes and control characters
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Parse and validate a key.
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();

        if key.is_empty() {
            return Err(StorageError::invalid_key(key, "key is empty"));
        }
        if key.starts_with('/') {
            return Err(StorageError::invalid_key(key, "key must be relative"));
        }
        if key.contains('\\') {
            return Err(StorageError::invalid_key(key, "backslashes are not allowed"));
        }
        if key.chars().any(char::is_control) {
            return Err(StorageError::invalid_key(
                key,
                "control characters are not allowed",
            ));
        }
        if key.ends_with('/') {
            return Err(StorageError::invalid_key(key, "key must name an object"));
        }
        let bad_segment = key.split('/').find_map(|segment| match segment {
            "" => Some("empty path segment"),
            "." | ".." => Some("'.' and '..' segments are not allowed"),
            _ => None,
        });
        if let Some(reason) = bad_segment {
            return Err(StorageError::invalid_key(key, reason));
        }

        Ok(Self(key))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
