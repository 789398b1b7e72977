//! Storage error types.

use std::io;

use thiserror::Error;

use super::key::StorageKey;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No object exists at the key.
    #[error("object not found: {key}")]
    NotFound {
        /// Key that was not found.
        key: String,
    },

    /// The key is malformed or would escape the storage root.
    #[error("invalid storage key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The backend rejected the credentials. Never retried.
    #[error("storage authentication failed: {0}")]
    AuthFailure(String),

    /// Transport failure that persisted through every attempt.
    #[error("storage request failed after {attempts} attempt(s): {message}")]
    NetworkFailure {
        /// Attempts made before giving up.
        attempts: u32,
        /// Last transport error.
        message: String,
    },

    /// The backend refused the request because of a size, rate or quota limit.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The backend could not be built from its settings.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Any other non-retryable backend failure.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl ToString) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    /// Create an invalid key error.
    #[must_use]
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error for a single attempt.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            attempts: 1,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Whether another attempt could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }

    /// Whether this is a [`StorageError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Classify an OpenDAL error raised while operating on `key`.
    pub(crate) fn from_operator(key: &StorageKey, err: &opendal::Error) -> Self {
        use opendal::ErrorKind;

        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => Self::not_found(key),
            ErrorKind::PermissionDenied => Self::AuthFailure(message),
            ErrorKind::RateLimited => Self::QuotaExceeded(message),
            _ if err.is_temporary() => Self::network(message),
            ErrorKind::ConfigInvalid => Self::Configuration(message),
            _ => {
                let response = operator_message(err);
                if has_error_code(&response, QUOTA_CODES) {
                    Self::QuotaExceeded(message)
                } else if has_error_code(&response, AUTH_CODES) {
                    Self::AuthFailure(message)
                } else {
                    Self::Operation(message)
                }
            }
        }
    }

    /// Classify a filesystem error raised while operating on `key`.
    pub(crate) fn from_io(key: &StorageKey, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::not_found(key),
            io::ErrorKind::PermissionDenied => {
                Self::operation(format!("permission denied for '{key}': {err}"))
            }
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => {
                Self::QuotaExceeded(format!("{key}: {err}"))
            }
            _ => Self::operation(format!("{key}: {err}")),
        }
    }
}

// S3 error codes that the operator reports without a dedicated kind.
const QUOTA_CODES: &[&str] = &["QuotaExceeded", "EntityTooLarge", "InsufficientStorage"];
const AUTH_CODES: &[&str] = &["InvalidAccessKeyId", "SignatureDoesNotMatch", "Unauthorized"];

/// The operator's own message, without the context it attaches (object
/// path, response headers).
fn operator_message(err: &opendal::Error) -> String {
    // Debug renders `<kind> (<status>) at <op> => <message>` first and the
    // context in later sections; Display mixes context in before the message.
    let rendered = format!("{err:?}");
    let Some((header, _)) = rendered.split_once('\n') else {
        return String::new();
    };
    if !header.contains(" => ") {
        return String::new();
    }
    let Some((_, body)) = rendered.split_once(" => ") else {
        return String::new();
    };
    let end = ["\n\nContext:", "\n\nSource:", "\n\nBacktrace:"]
        .iter()
        .filter_map(|section| body.find(section))
        .min()
        .unwrap_or(body.len());
    body[..end].trim_end().to_string()
}

/// Whether an S3 error body names one of `codes`.
///
/// Matches only the code field, parsed (`code: "X"`) or raw XML
/// (`<Code>X</Code>`), so object names and resources never match.
fn has_error_code(response: &str, codes: &[&str]) -> bool {
    codes.iter().any(|code| {
        response.contains(&format!("code: \"{code}\""))
            || response.contains(&format!("<Code>{code}</Code>"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> StorageKey {
        StorageKey::new("students/1/report.pdf").expect("valid key")
    }

    #[test]
    fn test_only_network_failures_are_retryable() {
        assert!(StorageError::network("reset").is_retryable());
        assert!(!StorageError::not_found("k").is_retryable());
        assert!(!StorageError::AuthFailure("denied".into()).is_retryable());
        assert!(!StorageError::QuotaExceeded("full".into()).is_retryable());
        assert!(!StorageError::operation("bad request").is_retryable());
    }

    #[test]
    fn test_operator_not_found_maps_to_not_found() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "no such key");
        let mapped = StorageError::from_operator(&key(), &err);
        assert!(matches!(mapped, StorageError::NotFound { key } if key == "students/1/report.pdf"));
    }

    #[test]
    fn test_operator_permission_denied_maps_to_auth_failure() {
        let err = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "403 Forbidden");
        assert!(matches!(
            StorageError::from_operator(&key(), &err),
            StorageError::AuthFailure(_)
        ));
    }

    #[test]
    fn test_operator_temporary_maps_to_network_failure() {
        let err = opendal::Error::new(opendal::ErrorKind::Unexpected, "connection reset")
            .set_temporary();
        assert!(StorageError::from_operator(&key(), &err).is_retryable());
    }

    #[test]
    fn test_operator_quota_maps_to_quota_exceeded() {
        let err = opendal::Error::new(opendal::ErrorKind::RateLimited, "SlowDown");
        assert!(matches!(
            StorageError::from_operator(&key(), &err),
            StorageError::QuotaExceeded(_)
        ));

        let err = opendal::Error::new(
            opendal::ErrorKind::Unexpected,
            r#"S3Error { code: "EntityTooLarge", message: "Your proposed upload exceeds the maximum allowed size", resource: "/hub-media/students/1/report.pdf", request_id: "4442587FB7D0A2F9" }"#,
        )
        .with_context("path", "students/1/report.pdf");
        assert!(matches!(
            StorageError::from_operator(&key(), &err),
            StorageError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_operator_raw_xml_auth_code_maps_to_auth_failure() {
        let err = opendal::Error::new(
            opendal::ErrorKind::Unexpected,
            "<Error><Code>Unauthorized</Code><Message>bad token</Message></Error>",
        );
        assert!(matches!(
            StorageError::from_operator(&key(), &err),
            StorageError::AuthFailure(_)
        ));
    }

    #[test]
    fn test_object_names_never_change_the_classification() {
        for path in ["reports/QuotaExceeded.csv", "docs/Unauthorized.pdf"] {
            let object = StorageKey::new(path).expect("valid key");
            let err = opendal::Error::new(opendal::ErrorKind::Unexpected, "connection reset by peer")
                .with_operation("read")
                .with_context("service", "s3")
                .with_context("path", path)
                .set_temporary();

            let mapped = StorageError::from_operator(&object, &err);

            assert!(
                matches!(mapped, StorageError::NetworkFailure { attempts: 1, .. }),
                "{path}: {mapped:?}"
            );
        }
    }

    #[test]
    fn test_resource_field_is_not_an_error_code() {
        let object = StorageKey::new("exports/EntityTooLarge.zip").expect("valid key");
        let err = opendal::Error::new(
            opendal::ErrorKind::Unexpected,
            r#"S3Error { code: "InvalidRequest", message: "bad range", resource: "/hub-media/exports/EntityTooLarge.zip", request_id: "1" }"#,
        )
        .with_context("path", "exports/EntityTooLarge.zip");

        assert!(matches!(
            StorageError::from_operator(&object, &err),
            StorageError::Operation(_)
        ));
    }

    #[test]
    fn test_operator_persistent_error_is_not_retried() {
        let err = opendal::Error::new(opendal::ErrorKind::Unexpected, "400 Bad Request");
        assert!(matches!(
            StorageError::from_operator(&key(), &err),
            StorageError::Operation(_)
        ));
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert!(StorageError::from_io(&key(), &err).is_not_found());
    }
}
