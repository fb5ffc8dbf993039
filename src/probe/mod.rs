//! Single-request HTTP(S) probes
//!
//! A probe issues one GET against one target and classifies the result as
//! success or failure. There are no retries here: retrying is the job of the
//! polling interval and the alert threshold.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpProber;

/// Result of probing one target once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure(String),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Success => None,
            ProbeOutcome::Failure(reason) => Some(reason),
        }
    }
}

impl From<Result<(), ProbeError>> for ProbeOutcome {
    fn from(result: Result<(), ProbeError>) -> Self {
        match result {
            Ok(()) => ProbeOutcome::Success,
            Err(e) => ProbeOutcome::Failure(e.to_string()),
        }
    }
}

/// Something that can check the health of an address
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, address: &str) -> ProbeOutcome;
}

/// Which HTTP status codes count as a failed probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailOn {
    /// Any status >= 400
    #[default]
    #[serde(rename = "4xx")]
    ClientError,
    /// Any status >= 500
    #[serde(rename = "5xx")]
    ServerError,
    /// Anything other than 200
    #[serde(rename = "non200")]
    NonOk,
}

impl FailOn {
    pub fn is_failure(&self, status: u16) -> bool {
        match self {
            FailOn::ClientError => status >= 400,
            FailOn::ServerError => status >= 500,
            FailOn::NonOk => status != 200,
        }
    }
}

/// TLS policy for a test item
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Verify the server certificate chain and hostname
    pub verify: bool,
    /// Client certificate for mutual TLS
    pub identity: Option<ClientIdentity>,
}

/// PEM-encoded client certificate and private key
#[derive(Clone)]
pub struct ClientIdentity {
    pub cert_pem: String,
    pub key_pem: String,
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("cert_pem", &format_args!("<{} bytes>", self.cert_pem.len()))
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

/// Probe errors; the display text becomes the failure reason
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0}")]
    Network(String),

    #[error("read body: {0}")]
    Body(String),

    #[error("status code {0} not ok")]
    Status(u16),
}
