// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persistent configuration.
//!
//! Stored as TOML through confy. Every field has a serde default so a
//! partial or older file still loads.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use fulfillment_client::{MonitorConfig, RetryPolicy};
use log::warn;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "fulfillment-monitor";
const CONFIG_NAME: &str = "config";

/// Selects the environment; wins over the configuration file.
pub const ENV_VAR: &str = "FULFILLMENT_MONITOR_ENV";

pub const DEFAULT_LOCAL_URL: &str = "http://localhost:5001/api";
pub const DEFAULT_PUBLIC_URL: &str = "http://5.34.204.56:5001/api";

/// Which deployment of the service to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Public,
}

impl Environment {
    /// Parse `local` or `public`, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Public => f.write_str("public"),
        }
    }
}

/// Monitor configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Configuration schema version
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Environment used when neither the CLI nor `FULFILLMENT_MONITOR_ENV` picks one
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_local_url")]
    pub local_url: String,

    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,

    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    #[serde(default = "default_logs_interval_secs")]
    pub logs_interval_secs: u64,

    /// Attempts per status tick, including the first
    #[serde(default = "default_status_attempts")]
    pub status_attempts: u32,

    /// Pause between status attempts in milliseconds
    #[serde(default)]
    pub status_retry_delay_ms: u64,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_local_url() -> String {
    DEFAULT_LOCAL_URL.to_string()
}

fn default_public_url() -> String {
    DEFAULT_PUBLIC_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_status_interval_secs() -> u64 {
    30
}

fn default_ping_interval_secs() -> u64 {
    10
}

fn default_logs_interval_secs() -> u64 {
    5
}

fn default_status_attempts() -> u32 {
    fulfillment_client::probe::status::DEFAULT_STATUS_ATTEMPTS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            environment: Environment::default(),
            local_url: default_local_url(),
            public_url: default_public_url(),
            request_timeout_secs: default_request_timeout_secs(),
            status_interval_secs: default_status_interval_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            logs_interval_secs: default_logs_interval_secs(),
            status_attempts: default_status_attempts(),
            status_retry_delay_ms: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// The environment in effect: `env_override` (the value of
    /// [`ENV_VAR`]) if it names one, else the file's setting.
    pub fn effective_environment(&self, env_override: Option<&str>) -> Environment {
        env_override
            .and_then(|value| {
                let parsed = Environment::parse(value);
                if parsed.is_none() {
                    warn!("Ignoring {}={:?}: expected local or public", ENV_VAR, value);
                }
                parsed
            })
            .unwrap_or(self.environment)
    }

    pub fn base_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Local => &self.local_url,
            Environment::Public => &self.public_url,
        }
    }

    /// Per-request timeout; zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        secs_or_default(
            "request_timeout_secs",
            self.request_timeout_secs,
            default_request_timeout_secs(),
        )
    }

    /// Probe settings for [`fulfillment_client::Monitor::spawn`].
    ///
    /// A zero interval falls back to its default.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            status_interval: secs_or_default(
                "status_interval_secs",
                self.status_interval_secs,
                default_status_interval_secs(),
            ),
            ping_interval: secs_or_default(
                "ping_interval_secs",
                self.ping_interval_secs,
                default_ping_interval_secs(),
            ),
            logs_interval: secs_or_default(
                "logs_interval_secs",
                self.logs_interval_secs,
                default_logs_interval_secs(),
            ),
            status_retry: RetryPolicy {
                attempts: self.status_attempts,
                delay: Duration::from_millis(self.status_retry_delay_ms),
            },
        }
    }
}

fn secs_or_default(field: &str, value: u64, default: u64) -> Duration {
    if value == 0 {
        warn!("Ignoring {} = 0 in configuration, using {}s", field, default);
        Duration::from_secs(default)
    } else {
        Duration::from_secs(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_cadence() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.base_url(Environment::Local), "http://localhost:5001/api");
        assert_eq!(config.base_url(Environment::Public), "http://5.34.204.56:5001/api");
        assert_eq!(config.monitor_config(), MonitorConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"environment":"public","ping_interval_secs":3}"#).unwrap();
        assert_eq!(config.environment, Environment::Public);
        assert_eq!(config.ping_interval_secs, 3);
        assert_eq!(config.status_interval_secs, 30);
        assert_eq!(config.status_attempts, 2);
        assert_eq!(config.local_url, DEFAULT_LOCAL_URL);
    }

    #[test]
    fn test_env_var_overrides_file() {
        let config = AppConfig::default();
        assert_eq!(config.effective_environment(Some("public")), Environment::Public);
        assert_eq!(config.effective_environment(Some(" PUBLIC ")), Environment::Public);
        assert_eq!(config.effective_environment(None), Environment::Local);
    }

    #[test]
    fn test_unknown_env_value_falls_back_to_file() {
        let config = AppConfig {
            environment: Environment::Public,
            ..AppConfig::default()
        };
        assert_eq!(config.effective_environment(Some("staging")), Environment::Public);
    }

    #[test]
    fn test_zero_intervals_fall_back_to_defaults() {
        let config = AppConfig {
            status_interval_secs: 0,
            ping_interval_secs: 0,
            logs_interval_secs: 0,
            ..AppConfig::default()
        };
        let monitor = config.monitor_config();
        assert_eq!(monitor.status_interval, Duration::from_secs(30));
        assert_eq!(monitor.ping_interval, Duration::from_secs(10));
        assert_eq!(monitor.logs_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_nonzero_values_are_kept() {
        let config = AppConfig {
            request_timeout_secs: 3,
            ping_interval_secs: 2,
            ..AppConfig::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.monitor_config().ping_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("Local"), Some(Environment::Local));
        assert_eq!(Environment::parse("public\n"), Some(Environment::Public));
        assert_eq!(Environment::parse("staging"), None);
    }

    #[test]
    fn test_retry_settings_flow_into_monitor_config() {
        let config = AppConfig {
            status_attempts: 3,
            status_retry_delay_ms: 250,
            ..AppConfig::default()
        };
        let retry = config.monitor_config().status_retry;
        assert_eq!(retry.attempts, 3);
        assert_eq!(retry.delay, Duration::from_millis(250));
    }
}
