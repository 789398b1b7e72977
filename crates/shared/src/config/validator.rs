//! Parses raw configuration into [`ValidatedConfig`].
//!
//! Validation never stops at the first problem: every check runs and all
//! violations are returned together.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::error::{ValidationError, Violation};
use super::hosts::{is_wildcard_host, split_hosts};
use super::keys::{
    ALLOWED_HOSTS, DATABASE_URL, DEBUG, DEFAULT_DEBUG_HOSTS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MEDIA_ROOT, DEFAULT_MEDIA_URL, DEFAULT_REGION, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_TIMEOUT_SECS, INSECURE_SECRET_PREFIX, KNOWN_INSECURE_SECRETS, MAX_ATTEMPTS_LIMIT,
    MEDIA_ROOT, MEDIA_URL, MIN_SECRET_LENGTH, MIN_SECRET_UNIQUE_CHARS, REMOTE_ACCESS_KEY_ID,
    REMOTE_BUCKET_NAME, REMOTE_CUSTOM_DOMAIN, REMOTE_ENDPOINT_URL, REMOTE_REGION,
    REMOTE_SECRET_ACCESS_KEY, SECRET_KEY, STORAGE_MAX_ATTEMPTS, STORAGE_TIMEOUT_SECS,
    USE_REMOTE_STORAGE,
};
use super::raw::RawConfig;
use super::settings::{RemoteStorageSettings, Secret, StorageTuning, ValidatedConfig};

/// Deployment configuration validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates `raw`, returning typed settings or every violation found.
    pub fn validate(raw: &RawConfig) -> Result<ValidatedConfig, ValidationError> {
        let mut violations = Vec::new();

        // An unreadable DEBUG flag is checked as production.
        let debug = parse_flag(raw, DEBUG, true, &mut violations).unwrap_or(false);

        let secret_key = required(raw, SECRET_KEY, &mut violations);
        if let Some(secret) = secret_key
            && !debug
            && let Some(reason) = weak_secret_reason(secret)
        {
            violations.push(Violation::weak_secret(reason));
        }

        let database_url = required(raw, DATABASE_URL, &mut violations);
        let allowed_hosts = parse_allowed_hosts(raw, debug, &mut violations);

        let media_root = raw
            .get_non_blank(MEDIA_ROOT)
            .map_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT), PathBuf::from);
        let media_url = parse_media_url(raw, &mut violations);
        let tuning = parse_tuning(raw, &mut violations);

        let remote_storage = match parse_flag(raw, USE_REMOTE_STORAGE, false, &mut violations) {
            Some(true) => parse_remote(raw, &mut violations).map(Some),
            Some(false) => Some(None),
            None => None,
        };

        match (
            secret_key,
            database_url,
            allowed_hosts,
            media_url,
            tuning,
            remote_storage,
        ) {
            (
                Some(secret_key),
                Some(database_url),
                Some(allowed_hosts),
                Some(media_url),
                Some(tuning),
                Some(remote_storage),
            ) if violations.is_empty() => Ok(ValidatedConfig {
                secret_key: Secret::new(secret_key),
                debug,
                allowed_hosts,
                database_url: Secret::new(database_url),
                media_root,
                media_url,
                remote_storage,
                tuning,
            }),
            _ => Err(ValidationError::new(violations)),
        }
    }
}

fn required<'a>(raw: &'a RawConfig, key: &str, violations: &mut Vec<Violation>) -> Option<&'a str> {
    let value = raw.get_non_blank(key);
    if value.is_none() {
        violations.push(Violation::missing(key));
    }
    value
}

fn parse_flag(
    raw: &RawConfig,
    key: &str,
    default: bool,
    violations: &mut Vec<Violation>,
) -> Option<bool> {
    match raw.get_non_blank(key) {
        None => Some(default),
        Some(value) if value.eq_ignore_ascii_case("true") => Some(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Some(false),
        Some(value) => {
            violations.push(Violation::invalid(
                key,
                format!("expected 'true' or 'false', got '{value}'"),
            ));
            None
        }
    }
}

fn weak_secret_reason(secret: &str) -> Option<String> {
    if secret.starts_with(INSECURE_SECRET_PREFIX) {
        return Some(format!(
            "uses the '{INSECURE_SECRET_PREFIX}' development prefix"
        ));
    }
    if KNOWN_INSECURE_SECRETS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(secret))
    {
        return Some("matches a known insecure default".to_string());
    }
    if secret.chars().count() < MIN_SECRET_LENGTH {
        return Some(format!("shorter than {MIN_SECRET_LENGTH} characters"));
    }
    let distinct: BTreeSet<char> = secret.chars().collect();
    if distinct.len() < MIN_SECRET_UNIQUE_CHARS {
        return Some(format!(
            "fewer than {MIN_SECRET_UNIQUE_CHARS} distinct characters"
        ));
    }
    None
}

fn parse_allowed_hosts(
    raw: &RawConfig,
    debug: bool,
    violations: &mut Vec<Violation>,
) -> Option<BTreeSet<String>> {
    let mut hosts = BTreeSet::new();
    let mut valid = true;

    if let Some(value) = raw.get_non_blank(ALLOWED_HOSTS) {
        for entry in split_hosts(value) {
            if is_wildcard_host(entry) {
                violations.push(Violation::wildcard(entry));
                valid = false;
            } else if entry.chars().any(char::is_whitespace) {
                violations.push(Violation::invalid(
                    ALLOWED_HOSTS,
                    format!("host '{entry}' contains whitespace"),
                ));
                valid = false;
            } else {
                hosts.insert(entry.to_string());
            }
        }
    }

    if !valid {
        return None;
    }
    if hosts.is_empty() {
        if !debug {
            violations.push(Violation::missing(ALLOWED_HOSTS));
            return None;
        }
        hosts.extend(DEFAULT_DEBUG_HOSTS.iter().map(ToString::to_string));
    }
    Some(hosts)
}

fn parse_http_url(key: &str, value: &str, violations: &mut Vec<Violation>) -> Option<Url> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            Some(url)
        }
        Ok(url) => {
            violations.push(Violation::invalid(
                key,
                format!("expected an http(s) URL, got scheme '{}'", url.scheme()),
            ));
            None
        }
        Err(err) => {
            violations.push(Violation::invalid(key, format!("not a valid URL: {err}")));
            None
        }
    }
}

fn parse_media_url(raw: &RawConfig, violations: &mut Vec<Violation>) -> Option<String> {
    let Some(value) = raw.get_non_blank(MEDIA_URL) else {
        return Some(DEFAULT_MEDIA_URL.to_string());
    };

    if !value.ends_with('/') {
        violations.push(Violation::invalid(MEDIA_URL, "must end with '/'"));
        return None;
    }
    if value.starts_with('/') {
        return Some(value.to_string());
    }
    parse_http_url(MEDIA_URL, value, violations).map(|_| value.to_string())
}

fn parse_tuning(raw: &RawConfig, violations: &mut Vec<Violation>) -> Option<StorageTuning> {
    let timeout_secs = match raw.get_non_blank(STORAGE_TIMEOUT_SECS) {
        None => Some(DEFAULT_TIMEOUT_SECS),
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(secs),
            _ => {
                violations.push(Violation::invalid(
                    STORAGE_TIMEOUT_SECS,
                    format!("expected a positive number of seconds, got '{value}'"),
                ));
                None
            }
        },
    };

    let max_attempts = match raw.get_non_blank(STORAGE_MAX_ATTEMPTS) {
        None => Some(DEFAULT_MAX_ATTEMPTS),
        Some(value) => match value.parse::<u32>() {
            Ok(attempts) if (1..=MAX_ATTEMPTS_LIMIT).contains(&attempts) => Some(attempts),
            _ => {
                violations.push(Violation::invalid(
                    STORAGE_MAX_ATTEMPTS,
                    format!("expected a number between 1 and {MAX_ATTEMPTS_LIMIT}, got '{value}'"),
                ));
                None
            }
        },
    };

    Some(StorageTuning {
        request_timeout: Duration::from_secs(timeout_secs?),
        max_attempts: max_attempts?,
        retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
    })
}

fn parse_remote(
    raw: &RawConfig,
    violations: &mut Vec<Violation>,
) -> Option<RemoteStorageSettings> {
    let access_key_id = required(raw, REMOTE_ACCESS_KEY_ID, violations);
    let secret_access_key = required(raw, REMOTE_SECRET_ACCESS_KEY, violations);
    let bucket_name = required(raw, REMOTE_BUCKET_NAME, violations);
    let endpoint_url = required(raw, REMOTE_ENDPOINT_URL, violations)
        .and_then(|value| parse_http_url(REMOTE_ENDPOINT_URL, value, violations).map(|_| value));
    let region = raw.get_non_blank(REMOTE_REGION).unwrap_or(DEFAULT_REGION);

    let custom_domain = match raw.get_non_blank(REMOTE_CUSTOM_DOMAIN) {
        None => Some(None),
        Some(domain) if domain.contains('/') || domain.chars().any(char::is_whitespace) => {
            violations.push(Violation::invalid(
                REMOTE_CUSTOM_DOMAIN,
                "expected a bare domain such as 'media.example.com'",
            ));
            None
        }
        Some(domain) => Some(Some(domain.to_string())),
    };

    Some(RemoteStorageSettings {
        access_key_id: access_key_id?.to_string(),
        secret_access_key: Secret::new(secret_access_key?),
        bucket_name: bucket_name?.to_string(),
        endpoint_url: endpoint_url?.trim_end_matches('/').to_string(),
        region: region.to_string(),
        custom_domain: custom_domain?,
    })
}
