//! YunPian SMS channel

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::notifier::{Notifier, NotifierError};
use crate::config::SmsConfig;

/// Single-send endpoint of the YunPian v2 API
pub const YUNPIAN_SINGLE_SEND_URL: &str = "https://sms.yunpian.com/v2/sms/single_send.json";

/// Sends one SMS per configured phone through YunPian
pub struct YunPianSms {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    phones: Vec<String>,
    prefix: String,
}

#[derive(Debug, Deserialize)]
struct SendResult {
    code: i64,
    #[serde(default)]
    msg: String,
}

impl YunPianSms {
    pub fn new(config: &SmsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: YUNPIAN_SINGLE_SEND_URL.to_string(),
            api_key: config.api_key.clone(),
            phones: config.phones.clone(),
            prefix: config.sms_prefix.clone(),
        }
    }

    /// Point the channel at another endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn send_one(&self, phone: &str, text: &str) -> Result<(), NotifierError> {
        let form = [
            ("apikey", self.api_key.as_str()),
            ("mobile", phone),
            ("text", text),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(10))
            .form(&form)
            .send()
            .await
            .map_err(|e| NotifierError::Sms(format!("{}: {}", phone, e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::Sms(format!(
                "{}: provider returned status {}",
                phone,
                response.status()
            )));
        }

        let result: SendResult = response
            .json()
            .await
            .map_err(|e| NotifierError::Sms(format!("{}: bad response: {}", phone, e)))?;

        if result.code != 0 {
            return Err(NotifierError::Sms(format!(
                "{}: provider code {}: {}",
                phone, result.code, result.msg
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for YunPianSms {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, message: &str) -> Result<(), NotifierError> {
        let text = format!("{}{}", self.prefix, message);

        let mut errors = Vec::new();
        for phone in &self.phones {
            if let Err(e) = self.send_one(phone, &text).await {
                errors.push(e);
            }
        }

        NotifierError::collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Form, Json, Router};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    type Received = Arc<Mutex<Vec<HashMap<String, String>>>>;

    async fn provider(code: i64) -> (String, Received) {
        let received: Received = Arc::new(Mutex::new(Vec::new()));

        let router = Router::new()
            .route(
                "/v2/sms/single_send.json",
                post(
                    move |State(received): State<Received>,
                          Form(form): Form<HashMap<String, String>>| async move {
                        received.lock().push(form);
                        Json(serde_json::json!({ "code": code, "msg": "status" }))
                    },
                ),
            )
            .with_state(Arc::clone(&received));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{}/v2/sms/single_send.json", addr), received)
    }

    fn config() -> SmsConfig {
        SmsConfig {
            enable: true,
            api_key: "test-key".to_string(),
            phones: vec!["13800000001".to_string(), "13800000002".to_string()],
            sms_prefix: "[ops]".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sends_to_every_phone_with_prefix() {
        let (endpoint, received) = provider(0).await;
        let sms = YunPianSms::new(&config()).with_endpoint(endpoint);

        sms.send("[api-1](10.0.0.1:80) recovered").await.unwrap();

        let received = received.lock();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0]["apikey"], "test-key");
        assert_eq!(received[0]["mobile"], "13800000001");
        assert_eq!(received[1]["mobile"], "13800000002");
        assert_eq!(received[0]["text"], "[ops][api-1](10.0.0.1:80) recovered");
    }

    #[tokio::test]
    async fn test_provider_error_code_is_reported() {
        let (endpoint, received) = provider(2).await;
        let sms = YunPianSms::new(&config()).with_endpoint(endpoint);

        let err = sms.send("hello").await.unwrap_err();
        assert!(matches!(err, NotifierError::Multiple(ref errors) if errors.len() == 2));
        assert_eq!(received.lock().len(), 2);
    }
}
