//! Alert messages and notification channels
//!
//! Alerts are produced by the monitor on health transitions and handed to a
//! [`Dispatcher`], which fans them out to the enabled SMS and mail channels.

pub mod email;
pub mod message;
pub mod notifier;
pub mod sms;

pub use email::SmtpMailer;
pub use message::{Alert, AlertKind};
pub use notifier::{Dispatcher, Notifier, NotifierError};
pub use sms::YunPianSms;
