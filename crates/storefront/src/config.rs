//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `KV_API_BASE_URL` - Catalog API base URL, including any path prefix (default: `http://localhost:8000`)
//! - `KV_API_TOKEN` - Bearer token attached to every API request
//! - `KV_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: 5)
//! - `KV_PAGE_LIMIT` - Page size for catalog fetches (default: 100)
//! - `KV_CHECK_API` - Check API availability once at startup (default: true)
//! - `KV_STORAGE_PATH` - JSON file used as persistent storage (default: in-memory)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog API configuration
    pub api: ApiConfig,
    /// Path of the storage file; `None` keeps state in memory only
    pub storage_path: Option<PathBuf>,
}

/// Catalog API client configuration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: Url,
    /// Bearer token for the `Authorization` header
    pub token: Option<SecretString>,
    /// Per-request timeout; expiry counts as a fetch failure
    pub timeout: Duration,
    /// `limit` query parameter for list endpoints
    pub page_limit: u32,
    /// Whether to check API availability at startup
    pub check_availability: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("page_limit", &self.page_limit)
            .field("check_availability", &self.check_availability)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_limit: DEFAULT_PAGE_LIMIT,
            check_availability: true,
        }
    }
}

impl ApiConfig {
    /// Configuration pointing at `base_url` with all other settings at their defaults.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }
}

#[allow(clippy::expect_used)] // constant input
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = Url::parse(&get_env_or_default("KV_API_BASE_URL", DEFAULT_BASE_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("KV_API_BASE_URL".to_string(), e.to_string()))?;
        let token = get_optional_env("KV_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        let timeout_secs = parse_env("KV_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "KV_API_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let page_limit = parse_env("KV_PAGE_LIMIT", DEFAULT_PAGE_LIMIT)?;
        let check_availability = parse_bool(
            "KV_CHECK_API",
            &get_env_or_default("KV_CHECK_API", "true"),
        )?;
        let storage_path = get_optional_env("KV_STORAGE_PATH").map(PathBuf::from);

        Ok(Self {
            api: ApiConfig {
                base_url,
                token,
                timeout: Duration::from_secs(timeout_secs),
                page_limit,
                check_availability,
            },
            storage_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`).
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "no").unwrap());
        assert!(!parse_bool("X", " off ").unwrap());
    }

    #[test]
    fn test_parse_bool_invalid() {
        let err = parse_bool("KV_CHECK_API", "maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "KV_CHECK_API"));
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        let value: u32 = parse_env("KV_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.page_limit, 100);
        assert!(config.check_availability);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let config = ApiConfig {
            token: Some(SecretString::from("super_secret_bearer_token")),
            ..ApiConfig::default()
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost:8000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer_token"));
    }
}
