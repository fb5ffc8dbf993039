//! SMTP mail channel

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::notifier::{Notifier, NotifierError};
use crate::config::{ConfigError, MailConfig};

const DEFAULT_SMTP_PORT: u16 = 25;
const SENDER_NAME: &str = "apiwatch";
const SUBJECT: &str = "Server health alert";

/// Sends plain-text alert mail through an SMTP relay (STARTTLS)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, ConfigError> {
        let (host, port) = split_host_port(&config.smtp)?;

        let sender: Address = config
            .username
            .parse()
            .map_err(|e| ConfigError::Mail(format!("invalid username {:?}: {}", config.username, e)))?;
        let from = Mailbox::new(Some(SENDER_NAME.to_string()), sender);

        let to = config
            .to
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>()
                    .map_err(|e| ConfigError::Mail(format!("invalid recipient {:?}: {}", addr, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| ConfigError::Mail(format!("smtp relay {:?}: {}", host, e)))?
            .port(port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn build_message(&self, body: &str) -> Result<Message, NotifierError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        builder
            .body(body.to_string())
            .map_err(|e| NotifierError::Email(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, message: &str) -> Result<(), NotifierError> {
        let email = self.build_message(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotifierError::Email(e.to_string()))?;
        Ok(())
    }
}

/// `host` or `host:port`
fn split_host_port(smtp: &str) -> Result<(&str, u16), ConfigError> {
    let smtp = smtp.trim();
    match smtp.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| ConfigError::Mail(format!("invalid smtp port in {:?}", smtp)))?;
            Ok((host, port))
        }
        None => Ok((smtp, DEFAULT_SMTP_PORT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            enable: true,
            username: "monitor@example.com".to_string(),
            password: "secret".to_string(),
            smtp: "smtp.example.com:587".to_string(),
            to: vec![
                "ops@example.com".to_string(),
                "Oncall <oncall@example.com>".to_string(),
            ],
        }
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(
            split_host_port("smtp.example.com").unwrap(),
            ("smtp.example.com", 25)
        );
        assert_eq!(
            split_host_port("smtp.example.com:465").unwrap(),
            ("smtp.example.com", 465)
        );
        assert!(split_host_port("smtp.example.com:abc").is_err());
    }

    #[test]
    fn test_message_has_all_recipients() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let message = mailer.build_message("[api-1](10.0.0.1:80) recovered").unwrap();

        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 2);
        assert_eq!(
            envelope.from().map(|a| a.to_string()),
            Some("monitor@example.com".to_string())
        );

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Server health alert"));
        assert!(raw.contains("[api-1](10.0.0.1:80) recovered"));
    }

    #[test]
    fn test_invalid_addresses_are_config_errors() {
        let mut bad_sender = config();
        bad_sender.username = "not-an-address".to_string();
        assert!(matches!(
            SmtpMailer::new(&bad_sender),
            Err(ConfigError::Mail(_))
        ));

        let mut bad_recipient = config();
        bad_recipient.to = vec!["nobody".to_string()];
        assert!(matches!(
            SmtpMailer::new(&bad_recipient),
            Err(ConfigError::Mail(_))
        ));
    }
}
