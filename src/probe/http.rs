use async_trait::async_trait;

use super::{FailOn, Probe, ProbeError, ProbeOutcome, TlsConfig};
use crate::config::{ConfigError, Scheme, TestItem};

/// reqwest-backed probe for one test item
///
/// The client is built once per item so connections are reused across
/// rounds; the item's timeout covers connect, TLS handshake and body read.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    scheme: Scheme,
    path: String,
    fail_on: FailOn,
}

impl HttpProber {
    pub fn new(item: &TestItem) -> Result<Self, ConfigError> {
        let client = build_client(item)?;
        Ok(Self {
            client,
            scheme: item.scheme,
            path: item.path.clone(),
            fail_on: item.fail_on,
        })
    }

    /// `scheme://address+path`
    pub fn url_for(&self, address: &str) -> String {
        format!("{}://{}{}", self.scheme.as_str(), address, self.path)
    }

    async fn check(&self, address: &str) -> Result<(), ProbeError> {
        let url = self.url_for(address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        // Drain the body so the connection can go back to the pool.
        response
            .bytes()
            .await
            .map_err(|e| ProbeError::Body(e.to_string()))?;

        if self.fail_on.is_failure(status) {
            return Err(ProbeError::Status(status));
        }

        Ok(())
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, address: &str) -> ProbeOutcome {
        self.check(address).await.into()
    }
}

fn build_client(item: &TestItem) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .timeout(item.request_timeout)
        .user_agent(concat!("apiwatch/", env!("CARGO_PKG_VERSION")));

    builder = apply_tls(builder, &item.tls).map_err(|reason| ConfigError::ClientIdentity {
        item: item.name.clone(),
        reason,
    })?;

    builder.build().map_err(|e| ConfigError::HttpClient {
        item: item.name.clone(),
        reason: e.to_string(),
    })
}

fn apply_tls(
    builder: reqwest::ClientBuilder,
    tls: &TlsConfig,
) -> Result<reqwest::ClientBuilder, String> {
    let mut builder = builder.danger_accept_invalid_certs(!tls.verify);

    if let Some(identity) = &tls.identity {
        let mut pem = identity.cert_pem.trim_end().as_bytes().to_vec();
        pem.push(b'\n');
        pem.extend_from_slice(identity.key_pem.as_bytes());

        let identity = reqwest::Identity::from_pem(&pem).map_err(|e| e.to_string())?;
        builder = builder.identity(identity);
    }

    Ok(builder)
}
