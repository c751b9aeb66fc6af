// Configuration management with layered configuration (file, env)

use crate::errors::ScheduleError;
use crate::models::PENDING_RESERVATION_STATUS;
use crate::scheduler::templates::DEFAULT_SITE_URL;
use crate::schedule::parse_timezone;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker left in secrets copied from the sample configuration
const PLACEHOLDER_MARKER: &str = "CHANGE_ME";

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreConfig,
    pub sms: SmsConfig,
    pub reminders: ReminderConfig,
    pub observability: ObservabilityConfig,
}

/// Order store (PostgREST endpoint) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub pending_status: String,
    /// Order type filter; empty disables it
    pub order_type: String,
    pub timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            table: "orders".to_string(),
            pending_status: PENDING_RESERVATION_STATUS.to_string(),
            order_type: "reserve".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// SMS gateway (Solapi) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub sender_number: String,
    pub timeout_seconds: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.solapi.com".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            sender_number: "01000000000".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// IANA name of the civil timezone "today" is taken in
    pub timezone: String,
    pub site_url: String,
    pub max_concurrent_sends: usize,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Seoul".to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            max_concurrent_sends: 1,
        }
    }
}

impl ReminderConfig {
    pub fn timezone(&self) -> Result<Tz, ScheduleError> {
        parse_timezone(&self.timezone)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load configuration from `config_dir` with layered precedence:
    /// defaults → default.toml → local.toml → env
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Secrets and per-deployment overrides, e.g. APP__SMS__API_SECRET
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate settings needed by every command
    pub fn validate(&self) -> Result<(), String> {
        if self.store.base_url.is_empty() {
            return Err("Store base_url cannot be empty".to_string());
        }
        if self.store.api_key.is_empty() {
            return Err("Store api_key cannot be empty".to_string());
        }
        if self.store.table.is_empty() {
            return Err("Store table cannot be empty".to_string());
        }
        if self.store.pending_status.is_empty() {
            return Err("Store pending_status cannot be empty".to_string());
        }
        if self.store.timeout_seconds == 0 {
            return Err("Store timeout_seconds must be greater than 0".to_string());
        }

        self.reminders.timezone().map_err(|e| e.to_string())?;
        if self.reminders.max_concurrent_sends == 0 {
            return Err("Reminders max_concurrent_sends must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Validate the SMS credentials; only required when messages are really sent
    pub fn validate_sms(&self) -> Result<(), String> {
        if self.sms.api_base_url.is_empty() {
            return Err("SMS api_base_url cannot be empty".to_string());
        }
        if self.sms.api_key.is_empty() || self.sms.api_secret.is_empty() {
            return Err("SMS api_key and api_secret must be set".to_string());
        }
        if self.sms.api_secret.contains(PLACEHOLDER_MARKER) {
            return Err("SMS api_secret still contains the CHANGE_ME placeholder".to_string());
        }
        if self.sms.sender_number.is_empty() {
            return Err("SMS sender_number cannot be empty".to_string());
        }
        if self.sms.timeout_seconds == 0 {
            return Err("SMS timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}
