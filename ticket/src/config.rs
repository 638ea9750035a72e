use std::env;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::ticket::models::ExpiryMode;

/// Application configuration for the ticket engine.
///
/// Loaded from configuration files with environment variable overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub ticket: TicketConfig,
}

/// Ticket lifecycle configuration.
///
/// Consumed, not owned, by the lifecycle service: which policy governs new
/// tickets, how long they stay valid, and whether one live ticket per user
/// is enforced.
#[derive(Debug, Deserialize, Clone)]
pub struct TicketConfig {
    /// Whether tickets expire at all. When false, new tickets are issued
    /// under `DoNotExpire` regardless of `expiry_mode`.
    pub tickets_expire: bool,
    /// Policy applied to new tickets when they do expire.
    pub expiry_mode: ExpiryMode,
    /// How long a ticket stays valid, in seconds.
    pub valid_duration_secs: i64,
    /// Reuse an owner's existing live ticket instead of minting a new one.
    pub single_ticket_per_user: bool,
}

impl TicketConfig {
    /// Ticket validity span as a chrono duration.
    ///
    /// # Returns
    /// `valid_duration_secs` as a Duration
    pub fn valid_duration(&self) -> Duration {
        Duration::seconds(self.valid_duration_secs)
    }
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            tickets_expire: true,
            expiry_mode: ExpiryMode::AfterInactivity,
            valid_duration_secs: 3600,
            single_ticket_per_user: true,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides.
    ///
    /// # Configuration Priority (highest to lowest)
    /// 1. Environment variables (TICKET__VALID_DURATION_SECS, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// # Returns
    /// Loaded configuration
    ///
    /// # Errors
    /// Returns error if required configuration values are missing or invalid
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: TICKET__TICKETS_EXPIRE=false overrides ticket.tickets_expire
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ticket_config() {
        let config = TicketConfig::default();

        assert!(config.tickets_expire);
        assert_eq!(config.expiry_mode, ExpiryMode::AfterInactivity);
        assert_eq!(config.valid_duration(), Duration::seconds(3600));
        assert!(config.single_ticket_per_user);
    }

    #[test]
    fn test_ticket_config_deserializes_snake_case_mode() {
        let config: TicketConfig = serde_json::from_str(
            r#"{
                "tickets_expire": true,
                "expiry_mode": "after_fixed_time",
                "valid_duration_secs": 60,
                "single_ticket_per_user": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.expiry_mode, ExpiryMode::AfterFixedTime);
        assert_eq!(config.valid_duration(), Duration::seconds(60));
        assert!(!config.single_ticket_per_user);
    }
}
