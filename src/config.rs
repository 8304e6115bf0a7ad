//! Configuration and settings management
//!
//! Loads settings from environment variables and defines the Telegram
//! size-tier constants used by the delivery policy.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Chat id that receives crash reports
    pub developer_chat_id: i64,

    /// Base URL of the tweet metadata API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bind address for the liveness responder
    #[serde(default = "default_health_host")]
    pub health_host: String,

    /// Bind port for the liveness responder
    #[serde(default = "default_health_port")]
    pub health_port: u16,

    /// Timeout applied to every outbound HTTP request, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.vxtwitter.com".to_string()
}

fn default_health_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_health_port() -> u16 {
    8080
}

const fn default_http_timeout_secs() -> u64 {
    10
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or a required value is
    /// missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from environment variables directly
            // Note: Environment::default() auto-converts UPPER_SNAKE_CASE to snake_case
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }
}

/// Largest file Telegram will fetch itself when a media URL is sent
/// by reference (tier 1).
pub const MAX_FILESIZE_DOWNLOAD: u64 = 20 * 1024 * 1024;

/// Largest file a bot may upload to Telegram (tier 2). Anything above
/// this is delivered as a plain link.
pub const MAX_FILESIZE_UPLOAD: u64 = 50 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("TELEGRAM_TOKEN", "dummy_token");
        env::set_var("DEVELOPER_CHAT_ID", "12345");

        let settings = Settings::new()?;
        assert_eq!(settings.telegram_token, "dummy_token");
        assert_eq!(settings.developer_chat_id, 12345);
        assert_eq!(settings.api_base_url, "https://api.vxtwitter.com");
        assert_eq!(settings.health_port, 8080);
        assert_eq!(settings.http_timeout_secs, 10);

        env::remove_var("TELEGRAM_TOKEN");
        env::remove_var("DEVELOPER_CHAT_ID");
        Ok(())
    }

    #[test]
    fn test_size_tiers_ordered() {
        assert!(MAX_FILESIZE_DOWNLOAD < MAX_FILESIZE_UPLOAD);
    }
}
