//! Host-header allow-list rules.

/// Whether `entry` matches more than one literal hostname.
///
/// Both `*` patterns and leading-dot domain suffixes (`.example.com`) count.
#[must_use]
pub fn is_wildcard_host(entry: &str) -> bool {
    entry.contains('*') || entry.starts_with('.')
}

/// Splits a raw `ALLOWED_HOSTS` value on commas, skipping empty entries.
///
/// Entries are not trimmed.
pub fn split_hosts(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').filter(|entry| !entry.is_empty())
}
