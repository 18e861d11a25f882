//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_BASE_URL` - Public URL the site is served from
//! - `SITE_SESSION_SECRET` - Session signing secret (min 32 chars)
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD` - Admin panel credential
//!   (default: admin/admin; a warning is logged when left at the default)
//! - `STORE_CREDENTIALS_BASE64` - base64-encoded JSON credentials for the
//!   document store. When absent or undecodable the site runs in degraded
//!   mode: reads render empty, writes are rejected.
//! - `UPLOAD_DIR` - Root directory for uploaded material files
//!   (default: static/uploads)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Minimum Shannon entropy (bits per character) for secrets.
/// A randomly generated 32+ char secret easily clears this.
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Invalid store credentials: {0}")]
    InvalidStoreCredentials(String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Admin panel shared credential
    pub admin: AdminCredentials,
    /// Raw base64 document-store credential blob, if provided
    store_credentials_b64: Option<String>,
    /// Root directory for uploaded files
    pub upload_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Shared credential for the admin panel.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
    /// True when both values were left at the shipped defaults.
    pub is_default: bool,
}

impl AdminCredentials {
    /// Check a submitted username/password pair against the credential.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.expose_secret() == password
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("is_default", &self.is_default)
            .finish()
    }
}

/// Credentials for the managed document store, decoded from
/// `STORE_CREDENTIALS_BASE64`.
#[derive(Clone, Deserialize)]
pub struct StoreCredentials {
    /// Base URL of the store's HTTP API
    pub endpoint: String,
    /// Bearer token for API calls
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_token: SecretString,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl std::fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the session secret fails validation. A missing or malformed
    /// `STORE_CREDENTIALS_BASE64` is NOT an error here; it surfaces from
    /// [`Self::store_credentials`] so startup can degrade instead of abort.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SITE_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_BASE_URL".to_string(), e.to_string()))?;

        let session_secret = SecretString::from(get_required_env("SITE_SESSION_SECRET")?);
        validate_session_secret(&session_secret, "SITE_SESSION_SECRET")?;

        let username = get_env_or_default("ADMIN_USERNAME", "admin");
        let password = get_env_or_default("ADMIN_PASSWORD", "admin");
        let is_default = username == "admin" && password == "admin";
        let admin = AdminCredentials {
            username,
            password: SecretString::from(password),
            is_default,
        };

        let store_credentials_b64 = get_optional_env("STORE_CREDENTIALS_BASE64");
        let upload_dir = PathBuf::from(get_env_or_default("UPLOAD_DIR", "static/uploads"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            admin,
            store_credentials_b64,
            upload_dir,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Decode the document-store credentials from the environment blob.
    ///
    /// Returns `Ok(None)` when no blob was supplied. The caller decides what
    /// a missing or malformed blob means; at startup both put the site into
    /// degraded mode rather than failing the process.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidStoreCredentials` if the blob is present
    /// but is not base64-encoded JSON of the expected shape.
    pub fn store_credentials(&self) -> Result<Option<StoreCredentials>, ConfigError> {
        let Some(b64) = self.store_credentials_b64.as_deref() else {
            return Ok(None);
        };
        let bytes = BASE64
            .decode(b64.trim())
            .map_err(|e| ConfigError::InvalidStoreCredentials(format!("bad base64: {e}")))?;
        let creds: StoreCredentials = serde_json::from_slice(&bytes)
            .map_err(|e| ConfigError::InvalidStoreCredentials(format!("bad JSON: {e}")))?;
        Ok(Some(creds))
    }

    /// Build a `SiteConfig` for tests without touching the environment.
    /// Skips secret validation; not for production use.
    #[doc(hidden)]
    #[must_use]
    pub fn for_tests(store_credentials_b64: Option<String>) -> Self {
        Self {
            host: "127.0.0.1".parse().expect("valid ip"),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("k".repeat(32)),
            admin: AdminCredentials {
                username: "admin".to_string(),
                password: SecretString::from("admin"),
                is_default: true,
            },
            store_credentials_b64,
            upload_dir: PathBuf::from("static/uploads"),
            sentry_dsn: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements and is
/// not an obvious placeholder.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: std::collections::HashMap<char, usize> = std::collections::HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_validate_session_secret_placeholder() {
        let secret = SecretString::from("changeme-changeme-changeme-changeme");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_session_secret_valid() {
        let secret = SecretString::from("aB3xY9mK2nL5pQ7rT0uW4zC6aB3xY9mK");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_validate_session_secret_low_entropy() {
        let secret = SecretString::from("abababababababababababababababab");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        // All same character carries no information.
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        // Two alternating characters: exactly one bit per character.
        assert!((shannon_entropy("abababab") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_socket_addr() {
        let config = SiteConfig::for_tests(None);
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_store_credentials_absent() {
        let config = SiteConfig::for_tests(None);
        assert!(config.store_credentials().unwrap().is_none());
    }

    #[test]
    fn test_store_credentials_decode() {
        let json = r#"{"endpoint":"https://store.test/v1","api_token":"tok-123"}"#;
        let blob = BASE64.encode(json);
        let config = SiteConfig::for_tests(Some(blob));
        let creds = config.store_credentials().unwrap().unwrap();
        assert_eq!(creds.endpoint, "https://store.test/v1");
        assert_eq!(creds.api_token.expose_secret(), "tok-123");
    }

    #[test]
    fn test_store_credentials_bad_base64() {
        let config = SiteConfig::for_tests(Some("%%%not-base64%%%".to_string()));
        assert!(matches!(
            config.store_credentials().unwrap_err(),
            ConfigError::InvalidStoreCredentials(_)
        ));
    }

    #[test]
    fn test_store_credentials_bad_json() {
        let blob = BASE64.encode("not json at all");
        let config = SiteConfig::for_tests(Some(blob));
        assert!(matches!(
            config.store_credentials().unwrap_err(),
            ConfigError::InvalidStoreCredentials(_)
        ));
    }

    #[test]
    fn test_admin_credentials_matches() {
        let admin = AdminCredentials {
            username: "admin".to_string(),
            password: SecretString::from("hunter2"),
            is_default: false,
        };
        assert!(admin.matches("admin", "hunter2"));
        assert!(!admin.matches("admin", "wrong"));
        assert!(!admin.matches("root", "hunter2"));
    }

    #[test]
    fn test_admin_credentials_debug_redacts_password() {
        let admin = AdminCredentials {
            username: "admin".to_string(),
            password: SecretString::from("hunter2"),
            is_default: false,
        };
        let debug_output = format!("{admin:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
