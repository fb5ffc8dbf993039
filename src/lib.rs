//! apiwatch: HTTP(S) uptime monitor with debounced alerting
//!
//! Periodically probes the configured endpoints of each test item, tracks a
//! failure streak per endpoint, and sends SMS/mail notifications when an
//! endpoint goes down or comes back.
//!
//! # Features
//!
//! - **Concurrent rounds**: every target of an item is probed in parallel;
//!   the round completes only when all probes are done
//! - **Debounced alerts**: an alert fires once when the failure streak reaches
//!   the item's threshold, a recovery notice once when it ends
//! - **Independent items**: one long-running task per test item, each with
//!   its own interval, timeout, TLS policy and state
//! - **Best-effort delivery**: notification failures are logged, never fatal
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use apiwatch::{config, monitor, Dispatcher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = config::load("./config.json")?;
//! let dispatcher = Arc::new(Dispatcher::from_settings(&settings)?);
//!
//! for runner in monitor::build_runners(&settings, dispatcher)? {
//!     let report = runner.tick().await;
//!     println!("{}: {} healthy, {} failing", report.item, report.healthy(), report.failing());
//! }
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod config;
pub mod monitor;
pub mod probe;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use alerts::{Alert, Dispatcher, Notifier, NotifierError};
pub use config::{ConfigError, Settings, TestItem};
pub use monitor::{ItemRunner, RoundReport};
pub use probe::{Probe, ProbeOutcome};
