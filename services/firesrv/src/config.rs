//! Fire monitor configuration
//!
//! Loaded once at startup from `config/firesrv.yaml` (or `--config`) and the
//! raw environment variables listed in [`ENV_KEYS`]. Notification groups are
//! optional: each one is enabled only when its credentials are present.

use std::time::Duration;

use common::config_loader::{config_sources, load_layered, ConfigFile};
use common::serde_helpers::{deserialize_f64_flexible, deserialize_optional_string};
use serde::Deserialize;

use crate::error::{FireSrvError, Result};

/// Environment variables that override the config file
pub const ENV_KEYS: &[&str] = &[
    "ALARM_THRESHOLD",
    "TWILIO_ACCT_SID",
    "TWILIO_AUTH_TOKEN",
    "NUMBER_TO_SEND_TO",
    "TWILIO_OUTGOING_NUMBER",
    "SERVER",
    "AUTH_TOKEN",
];

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_BLINK_INTERVAL_MS: u64 = 250;
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone, Deserialize)]
pub struct FireConfig {
    /// Temperature at or above which the alarm starts
    #[serde(deserialize_with = "deserialize_f64_flexible")]
    pub alarm_threshold: f64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_blink_interval_ms")]
    pub blink_interval_ms: u64,

    // SMS group
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub twilio_acct_sid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub twilio_auth_token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub number_to_send_to: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub twilio_outgoing_number: Option<String>,
    #[serde(default = "default_twilio_api_base")]
    pub twilio_api_base: String,

    // Datastore group
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub server: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub auth_token: Option<String>,

    /// Per-request timeout for notifications; unset means none
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,

    /// Log root directory, overridden by `FIRE_LOG_DIR`
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub log_dir: Option<String>,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub hardware: HardwareConfig,
}

/// Simulated sensor script
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulationConfig {
    /// Readings replayed in a loop; empty means the built-in heat ramp
    #[serde(default)]
    pub readings: Vec<f64>,
}

/// Device locations for the Linux drivers
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// IIO raw value of the analog input the sensor is wired to
    pub sensor_path: String,
    /// Full-scale ADC value
    pub adc_max: u32,
    /// I2C bus of the RGB LCD
    pub i2c_bus: String,
    /// PWM chip and channel of the buzzer
    pub pwm_chip: String,
    pub pwm_channel: u32,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            sensor_path: "/sys/bus/iio/devices/iio:device1/in_voltage0_raw".to_string(),
            adc_max: 1023,
            i2c_bus: "/dev/i2c-6".to_string(),
            pwm_chip: "/sys/class/pwm/pwmchip0".to_string(),
            pwm_channel: 0,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_blink_interval_ms() -> u64 {
    DEFAULT_BLINK_INTERVAL_MS
}

fn default_twilio_api_base() -> String {
    DEFAULT_TWILIO_API_BASE.to_string()
}

/// Enabled SMS notification settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub to: String,
    pub from: String,
    pub api_base: String,
}

/// Enabled datastore notification settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreSettings {
    pub endpoint: String,
    pub auth_token: String,
}

impl FireConfig {
    /// Load from `file` and the environment, then validate
    pub fn load(file: Option<&ConfigFile>) -> Result<Self> {
        Self::load_with_env(file, ENV_KEYS)
    }

    /// Sources [`FireConfig::load`] reads from `file` and the environment
    pub fn sources(file: Option<&ConfigFile>) -> Vec<String> {
        config_sources(file, ENV_KEYS)
    }

    fn load_with_env(file: Option<&ConfigFile>, env_keys: &[&str]) -> Result<Self> {
        let config: Self = load_layered(file, env_keys)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration with only a threshold set
    pub fn with_threshold(alarm_threshold: f64) -> Self {
        Self {
            alarm_threshold,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            blink_interval_ms: DEFAULT_BLINK_INTERVAL_MS,
            twilio_acct_sid: None,
            twilio_auth_token: None,
            number_to_send_to: None,
            twilio_outgoing_number: None,
            twilio_api_base: default_twilio_api_base(),
            server: None,
            auth_token: None,
            http_timeout_ms: None,
            log_dir: None,
            simulation: SimulationConfig::default(),
            hardware: HardwareConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.alarm_threshold.is_finite() {
            return Err(FireSrvError::ConfigError(format!(
                "alarm_threshold must be a finite number, got {}",
                self.alarm_threshold
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(FireSrvError::ConfigError(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.blink_interval_ms == 0 {
            return Err(FireSrvError::ConfigError(
                "blink_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.http_timeout_ms == Some(0) {
            return Err(FireSrvError::ConfigError(
                "http_timeout_ms must be greater than zero when set".to_string(),
            ));
        }
        if !self.twilio_api_base.starts_with("http://")
            && !self.twilio_api_base.starts_with("https://")
        {
            return Err(FireSrvError::ConfigError(format!(
                "twilio_api_base must be an http(s) URL, got '{}'",
                self.twilio_api_base
            )));
        }
        if self.simulation.readings.iter().any(|r| !r.is_finite()) {
            return Err(FireSrvError::ConfigError(
                "simulation.readings must be finite numbers".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_ms.map(Duration::from_millis)
    }

    /// SMS settings, if the account SID, token, recipient and sender are set
    pub fn sms(&self) -> Option<SmsSettings> {
        let (Some(account_sid), Some(auth_token)) = (&self.twilio_acct_sid, &self.twilio_auth_token)
        else {
            return None;
        };
        let (Some(to), Some(from)) = (&self.number_to_send_to, &self.twilio_outgoing_number) else {
            return None;
        };

        Some(SmsSettings {
            account_sid: account_sid.clone(),
            auth_token: auth_token.clone(),
            to: to.clone(),
            from: from.clone(),
            api_base: self.twilio_api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Credentials are set but recipient or sender is missing
    pub fn sms_numbers_missing(&self) -> bool {
        self.twilio_acct_sid.is_some()
            && self.twilio_auth_token.is_some()
            && (self.number_to_send_to.is_none() || self.twilio_outgoing_number.is_none())
    }

    /// Datastore settings, if both server and token are set
    pub fn datastore(&self) -> Option<DatastoreSettings> {
        match (&self.server, &self.auth_token) {
            (Some(endpoint), Some(auth_token)) => Some(DatastoreSettings {
                endpoint: endpoint.clone(),
                auth_token: auth_token.clone(),
            }),
            _ => None,
        }
    }

    /// Human-readable summary, secrets omitted
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![
            format!("alarm threshold: {}", self.alarm_threshold),
            format!("poll interval: {} ms", self.poll_interval_ms),
            format!("blink interval: {} ms", self.blink_interval_ms),
        ];
        lines.push(match self.sms() {
            Some(sms) => format!("sms: enabled ({} -> {})", sms.from, sms.to),
            None if self.sms_numbers_missing() => "sms: disabled (numbers missing)".to_string(),
            None => "sms: disabled".to_string(),
        });
        lines.push(match self.datastore() {
            Some(ds) => format!("datastore: enabled ({})", ds.endpoint),
            None => "datastore: disabled".to_string(),
        });
        lines.push(match self.http_timeout_ms {
            Some(ms) => format!("notification timeout: {} ms", ms),
            None => "notification timeout: none".to_string(),
        });
        lines
    }
}
