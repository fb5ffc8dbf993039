//! Configuration loading and validation
//!
//! The file is decoded into the raw [`Config`] layout and then validated
//! into [`Settings`]. Everything that can be wrong with a configuration is
//! reported here, at startup, so the monitoring loops never see a bad value.

pub mod duration;
pub mod schema;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub use duration::{parse_duration, DurationError};
pub use schema::{Config, MailConfig, SmsConfig, TestItemConfig};

use crate::probe::{ClientIdentity, FailOn, TlsConfig};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Request scheme for a test item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            _ => None,
        }
    }
}

/// A validated test item; read-only for the life of the process
#[derive(Debug, Clone)]
pub struct TestItem {
    pub name: String,
    pub path: String,
    pub scheme: Scheme,
    /// address -> display name
    pub targets: BTreeMap<String, String>,
    pub request_timeout: Duration,
    pub interval: Duration,
    /// Consecutive failures needed before alerting; 0 alerts on every failure
    pub alert_threshold: u32,
    pub tls: TlsConfig,
    pub fail_on: FailOn,
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub mail: MailConfig,
    pub sms: SmsConfig,
    pub items: Vec<TestItem>,
}

/// Read, decode and validate a configuration file
pub fn load(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Config::from_json(&text)?.validate()
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(self) -> Result<Settings, ConfigError> {
        if self.mail.enable {
            if self.mail.smtp.trim().is_empty() {
                return Err(ConfigError::Mail("smtp host is empty".to_string()));
            }
            if self.mail.to.is_empty() {
                return Err(ConfigError::Mail("no recipients".to_string()));
            }
        }

        if self.sms.enable {
            if self.sms.api_key.is_empty() {
                return Err(ConfigError::Sms("apiKey is empty".to_string()));
            }
            if self.sms.phones.is_empty() {
                return Err(ConfigError::Sms("no phones".to_string()));
            }
        }

        let items = self
            .test_items
            .into_iter()
            .map(TestItemConfig::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Settings {
            mail: self.mail,
            sms: self.sms,
            items,
        })
    }
}

impl TestItemConfig {
    pub fn validate(self) -> Result<TestItem, ConfigError> {
        let scheme = Scheme::parse(&self.http_proto).ok_or_else(|| ConfigError::InvalidScheme {
            item: self.name.clone(),
            scheme: self.http_proto.clone(),
        })?;

        let request_timeout = positive_duration(&self.name, "requestTimeout", &self.request_timeout)?;
        let interval = positive_duration(&self.name, "interval", &self.interval)?;

        let identity = match (self.cert, self.key) {
            (None, None) => None,
            (Some(cert_pem), Some(key_pem)) => Some(ClientIdentity { cert_pem, key_pem }),
            _ => return Err(ConfigError::IncompleteClientIdentity(self.name)),
        };

        if self.server_list.is_empty() {
            tracing::warn!(item = %self.name, "test item has no servers");
        }

        Ok(TestItem {
            name: self.name,
            path: self.url,
            scheme,
            targets: self.server_list,
            request_timeout,
            interval,
            alert_threshold: self.alert_threshold,
            tls: TlsConfig {
                verify: self.tls_verify,
                identity,
            },
            fail_on: self.fail_on,
        })
    }
}

fn positive_duration(item: &str, field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDuration {
        item: item.to_string(),
        field,
        value: value.to_string(),
        reason,
    };

    let duration = parse_duration(value).map_err(|e| invalid(e.to_string()))?;
    if duration.is_zero() {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(duration)
}

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Test item {item:?}: invalid {field} {value:?}: {reason}")]
    InvalidDuration {
        item: String,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Test item {item:?}: unsupported scheme {scheme:?}")]
    InvalidScheme { item: String, scheme: String },

    #[error("Test item {0:?}: cert and key must be given together")]
    IncompleteClientIdentity(String),

    #[error("Test item {item:?}: invalid client certificate: {reason}")]
    ClientIdentity { item: String, reason: String },

    #[error("Test item {item:?}: cannot build HTTP client: {reason}")]
    HttpClient { item: String, reason: String },

    #[error("Mail config: {0}")]
    Mail(String),

    #[error("SMS config: {0}")]
    Sms(String),
}
