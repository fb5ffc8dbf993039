//! Alert messages

use std::fmt;

use chrono::{DateTime, Utc};

/// What happened to a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertKind {
    /// The failure streak reached the alert threshold
    Down { reason: String },
    /// First success after an alerted streak
    Recovered,
}

/// A notification about one target of one test item
#[derive(Debug, Clone)]
pub struct Alert {
    /// Test item the target belongs to
    pub item: String,
    /// Display name of the target
    pub target: String,
    pub address: String,
    pub kind: AlertKind,
    /// Failure streak at the time of the alert (before reset, for recoveries)
    pub streak: u32,
    pub at: DateTime<Utc>,
}

impl Alert {
    pub fn down(
        item: impl Into<String>,
        target: impl Into<String>,
        address: impl Into<String>,
        reason: impl Into<String>,
        streak: u32,
    ) -> Self {
        Self {
            item: item.into(),
            target: target.into(),
            address: address.into(),
            kind: AlertKind::Down {
                reason: reason.into(),
            },
            streak,
            at: Utc::now(),
        }
    }

    pub fn recovered(
        item: impl Into<String>,
        target: impl Into<String>,
        address: impl Into<String>,
        streak: u32,
    ) -> Self {
        Self {
            item: item.into(),
            target: target.into(),
            address: address.into(),
            kind: AlertKind::Recovered,
            streak,
            at: Utc::now(),
        }
    }

    pub fn is_recovery(&self) -> bool {
        self.kind == AlertKind::Recovered
    }
}

/// Short form used for SMS and as the mail body headline
impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AlertKind::Down { reason } => {
                write!(f, "[{}]({}) request failed: {}", self.target, self.address, reason)
            }
            AlertKind::Recovered => write!(f, "[{}]({}) recovered", self.target, self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_message() {
        let alert = Alert::down("api", "api-1", "10.0.0.1:443", "status code 503 not ok", 2);
        assert_eq!(
            alert.to_string(),
            "[api-1](10.0.0.1:443) request failed: status code 503 not ok"
        );
        assert!(!alert.is_recovery());
    }

    #[test]
    fn test_recovered_message() {
        let alert = Alert::recovered("api", "api-1", "10.0.0.1:443", 3);
        assert_eq!(alert.to_string(), "[api-1](10.0.0.1:443) recovered");
        assert!(alert.is_recovery());
        assert_eq!(alert.streak, 3);
    }
}
