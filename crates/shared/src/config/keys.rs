//! Environment keys and their defaults.

/// Cryptographic signing secret for the host application.
pub const SECRET_KEY: &str = "SECRET_KEY";
/// Development vs production strictness.
pub const DEBUG: &str = "DEBUG";
/// Comma-separated list of exact hostnames.
pub const ALLOWED_HOSTS: &str = "ALLOWED_HOSTS";
/// Database URL, passed through opaquely.
pub const DATABASE_URL: &str = "DATABASE_URL";
/// Selects the remote object store instead of the local media directory.
pub const USE_REMOTE_STORAGE: &str = "USE_REMOTE_STORAGE";
/// Remote access key id.
pub const REMOTE_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
/// Remote secret access key.
pub const REMOTE_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
/// Remote bucket name.
pub const REMOTE_BUCKET_NAME: &str = "AWS_STORAGE_BUCKET_NAME";
/// Remote S3-compatible endpoint URL.
pub const REMOTE_ENDPOINT_URL: &str = "AWS_S3_ENDPOINT_URL";
/// Remote region.
pub const REMOTE_REGION: &str = "AWS_S3_REGION_NAME";
/// Optional public domain that serves the bucket.
pub const REMOTE_CUSTOM_DOMAIN: &str = "AWS_S3_CUSTOM_DOMAIN";
/// Local media directory.
pub const MEDIA_ROOT: &str = "MEDIA_ROOT";
/// Public URL prefix for media.
pub const MEDIA_URL: &str = "MEDIA_URL";
/// Per-request timeout for remote storage, in seconds.
pub const STORAGE_TIMEOUT_SECS: &str = "STORAGE_TIMEOUT_SECS";
/// Maximum attempts for a remote storage operation.
pub const STORAGE_MAX_ATTEMPTS: &str = "STORAGE_MAX_ATTEMPTS";

/// Every key the validator reads.
pub const KNOWN_KEYS: &[&str] = &[
    SECRET_KEY,
    DEBUG,
    ALLOWED_HOSTS,
    DATABASE_URL,
    USE_REMOTE_STORAGE,
    REMOTE_ACCESS_KEY_ID,
    REMOTE_SECRET_ACCESS_KEY,
    REMOTE_BUCKET_NAME,
    REMOTE_ENDPOINT_URL,
    REMOTE_REGION,
    REMOTE_CUSTOM_DOMAIN,
    MEDIA_ROOT,
    MEDIA_URL,
    STORAGE_TIMEOUT_SECS,
    STORAGE_MAX_ATTEMPTS,
];

/// Hosts served when debug is on and nothing is configured.
pub const DEFAULT_DEBUG_HOSTS: &[&str] = &["127.0.0.1", "localhost"];

/// Region used by S3-compatible providers that ignore regions (R2).
pub const DEFAULT_REGION: &str = "auto";

/// Default local media directory, relative to the working directory.
pub const DEFAULT_MEDIA_ROOT: &str = "media";

/// Default media URL prefix.
pub const DEFAULT_MEDIA_URL: &str = "/media/";

/// Default remote request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retry bound for remote operations.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound accepted for `STORAGE_MAX_ATTEMPTS`.
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Base delay of the exponential backoff between remote attempts.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;

/// Minimum secret key length outside debug mode.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Minimum number of distinct characters in a production secret key.
pub const MIN_SECRET_UNIQUE_CHARS: usize = 5;

/// Prefix of generated development secrets.
pub const INSECURE_SECRET_PREFIX: &str = "django-insecure-";

/// Secrets copied verbatim from templates and tutorials.
pub const KNOWN_INSECURE_SECRETS: &[&str] = &[
    "changeme",
    "change-me",
    "secret",
    "secret-key",
    "your-secret-key",
    "your-secret-key-here",
    "dev-secret-key",
    "insecure",
    "development",
];
