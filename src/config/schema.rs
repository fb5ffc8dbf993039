//! On-disk configuration layout (JSON)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::probe::FailOn;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default, rename = "YunPian")]
    pub sms: SmsConfig,
    #[serde(default, rename = "testItem")]
    pub test_items: Vec<TestItemConfig>,
}

/// SMTP mail notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// `host` or `host:port`
    #[serde(default)]
    pub smtp: String,
    #[serde(default)]
    pub to: Vec<String>,
}

/// YunPian SMS notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub phones: Vec<String>,
    /// Prepended to every message (providers usually require a signature)
    #[serde(default)]
    pub sms_prefix: String,
}

/// One monitored group of targets, as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestItemConfig {
    pub name: String,
    /// Request path appended to every address
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub http_proto: String,
    /// address -> display name
    #[serde(default)]
    pub server_list: BTreeMap<String, String>,
    pub request_timeout: String,
    pub interval: String,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u32,
    #[serde(default)]
    pub tls_verify: bool,
    #[serde(default)]
    pub cert: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub fail_on: FailOn,
}

fn default_alert_threshold() -> u32 {
    1
}
