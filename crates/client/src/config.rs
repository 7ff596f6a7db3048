//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `FASHION_STORE_API_URL` - Storefront API base URL (default: `http://localhost:3000/api/`)
//! - `FASHION_STORE_DATA_DIR` - Directory for guest state (default: `.fashion-store`)
//! - `FASHION_STORE_MERGE_ON_LOGIN` - Merge the guest cart and wishlist into the
//!   account on login (default: `false`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::session::LoginMergePolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is joined onto. Always ends with `/`.
    pub api_url: Url,
    /// Where the file-backed key/value store keeps guest state.
    pub data_dir: PathBuf,
    /// What happens to guest state on login.
    pub merge_policy: LoginMergePolicy,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default(
            "FASHION_STORE_API_URL",
            "http://localhost:3000/api/",
        ))?;
        let data_dir = PathBuf::from(get_env_or_default("FASHION_STORE_DATA_DIR", ".fashion-store"));
        let merge_policy = if parse_bool(
            "FASHION_STORE_MERGE_ON_LOGIN",
            &get_env_or_default("FASHION_STORE_MERGE_ON_LOGIN", "false"),
        )? {
            LoginMergePolicy::MergeIntoAccount
        } else {
            LoginMergePolicy::KeepSeparate
        };

        Ok(Self {
            api_url,
            data_dir,
            merge_policy,
        })
    }
}

/// Parse the API base URL, adding the trailing slash `Url::join` needs.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar("FASHION_STORE_API_URL".to_string(), e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_gets_trailing_slash() {
        let url = parse_api_url("https://shop.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/");
        assert_eq!(
            url.join("cart").unwrap().as_str(),
            "https://shop.example.com/api/cart"
        );
    }

    #[test]
    fn test_api_url_rejects_garbage() {
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "TRUE").unwrap());
        assert!(!parse_bool("K", "0").unwrap());
        assert!(parse_bool("K", "maybe").is_err());
    }
}
