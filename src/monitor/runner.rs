use std::sync::Arc;
use std::time::Duration;

use super::round::{PollRound, RoundReport};
use super::state::TargetState;
use crate::alerts::Dispatcher;
use crate::config::{ConfigError, TestItem};
use crate::probe::{HttpProber, Probe};

/// Drives one test item forever: run a round, sleep the interval, repeat
///
/// Every runner owns its own target state; runners share nothing except the
/// dispatcher.
pub struct ItemRunner {
    round: PollRound,
    interval: Duration,
}

impl ItemRunner {
    pub fn new(item: Arc<TestItem>, probe: Arc<dyn Probe>, dispatcher: Arc<Dispatcher>) -> Self {
        let interval = item.interval;
        Self {
            round: PollRound::new(item, probe, dispatcher),
            interval,
        }
    }

    /// Runner probing over HTTP(S) with the item's own client settings
    pub fn from_item(item: TestItem, dispatcher: Arc<Dispatcher>) -> Result<Self, ConfigError> {
        let probe = HttpProber::new(&item)?;
        Ok(Self::new(Arc::new(item), Arc::new(probe), dispatcher))
    }

    pub fn name(&self) -> &str {
        &self.round.item().name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> Arc<TargetState> {
        Arc::clone(self.round.state())
    }

    /// Run a single round
    pub async fn tick(&self) -> RoundReport {
        self.round.run().await
    }

    /// Loop forever. The next round starts `interval` after the previous one
    /// finished, so a slow target stretches that item's cadence.
    pub async fn run(&self) {
        tracing::info!(
            item = %self.name(),
            targets = self.round.item().targets.len(),
            interval = ?self.interval,
            threshold = self.round.item().alert_threshold,
            "Monitor started"
        );

        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Spawn the loop on its own task
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }
}
