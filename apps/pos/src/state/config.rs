//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TEAHOUSE_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use teahouse_core::Money;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosConfig {
    /// Base URL of the REST backend
    pub api_base_url: String,

    /// Route the UI redirects to when the session ends
    pub login_path: String,

    /// Token file override; `None` uses the platform app data directory
    pub token_path: Option<PathBuf>,

    /// Store name (header bar, receipts)
    pub store_name: String,

    /// Currency symbol, written after the amount
    pub currency_symbol: String,

    /// Thousands separator for amounts
    pub thousands_separator: char,
}

impl Default for PosConfig {
    /// Returns configuration suitable for local development.
    fn default() -> Self {
        PosConfig {
            api_base_url: "http://localhost:5000/api".to_string(),
            login_path: "/login".to_string(),
            token_path: None,
            store_name: "Teahouse".to_string(),
            currency_symbol: "₫".to_string(),
            thousands_separator: '.',
        }
    }
}

impl PosConfig {
    /// Loads configuration from environment variables over the defaults.
    ///
    /// ## Environment Variables
    /// - `TEAHOUSE_API_URL`: REST base URL (must be http or https)
    /// - `TEAHOUSE_LOGIN_PATH`: login route (must start with `/`)
    /// - `TEAHOUSE_TOKEN_PATH`: token file location
    /// - `TEAHOUSE_STORE_NAME`: store name
    /// - `TEAHOUSE_CURRENCY_SYMBOL`: currency symbol
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PosConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PosConfig::default();

        if let Some(url) = lookup("TEAHOUSE_API_URL") {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue("TEAHOUSE_API_URL".to_string()));
            }
            config.api_base_url = url;
        }

        if let Some(path) = lookup("TEAHOUSE_LOGIN_PATH") {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue("TEAHOUSE_LOGIN_PATH".to_string()));
            }
            config.login_path = path;
        }

        if let Some(path) = lookup("TEAHOUSE_TOKEN_PATH") {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidValue("TEAHOUSE_TOKEN_PATH".to_string()));
            }
            config.token_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("TEAHOUSE_STORE_NAME") {
            config.store_name = name;
        }

        if let Some(symbol) = lookup("TEAHOUSE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        Ok(config)
    }

    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::Money;
    /// use teahouse_pos_lib::state::PosConfig;
    ///
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_currency(Money::from_units(45_000)), "45.000₫");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        format!(
            "{}{}",
            amount.grouped(self.thousands_separator),
            self.currency_symbol
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
