//! Raw key/value configuration as read from the environment.

use std::collections::BTreeMap;

/// Unparsed configuration values.
///
/// Keys are case-insensitive. A key that was never set is absent; it is not
/// the same as a key set to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    values: BTreeMap<String, String>,
}

impl RawConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.values.insert(normalize(key.as_ref()), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize(key)).map(String::as_str)
    }

    /// Value for `key` unless it is absent or blank.
    #[must_use]
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Whether `key` was set at all.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&normalize(key))
    }

    /// Number of keys present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawConfig
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = Self::new();
        for (key, value) in iter {
            raw.insert(key, value);
        }
        raw
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let raw = RawConfig::new().with("SECRET_KEY", "abc");
        assert_eq!(raw.get("secret_key"), Some("abc"));
        assert_eq!(raw.get("Secret_Key"), Some("abc"));
    }

    #[test]
    fn test_absent_is_not_empty() {
        let raw = RawConfig::new().with("DEBUG", "");
        assert!(raw.contains("DEBUG"));
        assert_eq!(raw.get("DEBUG"), Some(""));
        assert_eq!(raw.get_non_blank("DEBUG"), None);
        assert!(!raw.contains("ALLOWED_HOSTS"));
        assert_eq!(raw.get("ALLOWED_HOSTS"), None);
    }

    #[test]
    fn test_from_iter_last_value_wins() {
        let raw: RawConfig = [("debug", "true"), ("DEBUG", "false")].into_iter().collect();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.get("DEBUG"), Some("false"));
    }
}
