//! Notification channels and fan-out

use std::sync::Arc;

use async_trait::async_trait;

use super::email::SmtpMailer;
use super::message::Alert;
use super::sms::YunPianSms;
use crate::config::{ConfigError, Settings};

/// A transport that delivers alert text somewhere
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs
    fn name(&self) -> &'static str;

    async fn send(&self, message: &str) -> Result<(), NotifierError>;
}

/// Sends alerts to every enabled channel
///
/// Delivery is best-effort: failures are logged and dropped, never retried,
/// and never reported back to the caller.
#[derive(Clone, Default)]
pub struct Dispatcher {
    channels: Vec<Arc<dyn Notifier>>,
}

impl Dispatcher {
    /// Dispatcher with no channels; alerts are only logged
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the channels enabled in the configuration
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let mut dispatcher = Self::new();

        if settings.mail.enable {
            dispatcher = dispatcher.with_channel(Arc::new(SmtpMailer::new(&settings.mail)?));
        }
        if settings.sms.enable {
            dispatcher = dispatcher.with_channel(Arc::new(YunPianSms::new(&settings.sms)));
        }

        Ok(dispatcher)
    }

    pub fn with_channel(mut self, channel: Arc<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Log the alert and hand its text to all channels concurrently
    pub async fn dispatch(&self, alert: &Alert) {
        let message = alert.to_string();

        if alert.is_recovery() {
            tracing::info!(
                item = %alert.item,
                target = %alert.target,
                address = %alert.address,
                streak = alert.streak,
                "Alert: {}",
                message
            );
        } else {
            tracing::warn!(
                item = %alert.item,
                target = %alert.target,
                address = %alert.address,
                streak = alert.streak,
                at = %alert.at.to_rfc3339(),
                "Alert: {}",
                message
            );
        }

        let sends = self.channels.iter().map(|channel| {
            let message = message.as_str();
            async move { (channel.name(), channel.send(message).await) }
        });

        for (channel, result) in futures::future::join_all(sends).await {
            match result {
                Ok(()) => {
                    tracing::debug!(channel, target = %alert.target, "Notification sent");
                }
                Err(e) => {
                    tracing::error!(
                        channel,
                        target = %alert.target,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("SMS error: {0}")]
    Sms(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Multiple notification failures: {0:?}")]
    Multiple(Vec<NotifierError>),
}

impl NotifierError {
    /// Fold per-recipient errors into one result
    pub fn collect(mut errors: Vec<NotifierError>) -> Result<(), NotifierError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(NotifierError::Multiple(errors)),
        }
    }
}
