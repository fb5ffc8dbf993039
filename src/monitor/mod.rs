//! Health polling and alert state machine
//!
//! One [`ItemRunner`] per test item loops over [`PollRound`]s. A round probes
//! every target concurrently, feeds each outcome through the [`Debouncer`]
//! against the item's [`TargetState`], dispatches any resulting alert, and
//! completes only when all targets are done.

pub mod debounce;
pub mod round;
pub mod runner;
pub mod state;

use std::sync::Arc;

pub use debounce::{Debouncer, Step, Transition};
pub use round::{PollRound, RoundReport, TargetReport};
pub use runner::ItemRunner;
pub use state::TargetState;

use crate::alerts::Dispatcher;
use crate::config::{ConfigError, Settings};

/// Build one HTTP runner per configured test item
pub fn build_runners(
    settings: &Settings,
    dispatcher: Arc<Dispatcher>,
) -> Result<Vec<ItemRunner>, ConfigError> {
    settings
        .items
        .iter()
        .cloned()
        .map(|item| ItemRunner::from_item(item, Arc::clone(&dispatcher)))
        .collect()
}

/// Spawn every runner on its own task
pub fn start_all(runners: Vec<ItemRunner>) -> Vec<tokio::task::JoinHandle<()>> {
    runners.into_iter().map(ItemRunner::start).collect()
}
