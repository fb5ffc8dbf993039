use std::sync::Arc;
use std::time::{Duration, Instant};

use super::debounce::{Debouncer, Transition};
use super::state::TargetState;
use crate::alerts::{Alert, Dispatcher};
use crate::config::TestItem;
use crate::probe::{Probe, ProbeOutcome};

/// Result for one target in one round
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub address: String,
    pub name: String,
    pub outcome: ProbeOutcome,
    /// Streak after this round's outcome
    pub streak: u32,
    pub transition: Transition,
}

/// Summary of one round of a test item
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub item: String,
    pub targets: Vec<TargetReport>,
    pub elapsed: Duration,
}

impl RoundReport {
    pub fn healthy(&self) -> usize {
        self.targets.iter().filter(|t| t.outcome.is_success()).count()
    }

    pub fn failing(&self) -> usize {
        self.targets.len() - self.healthy()
    }

    /// Number of alerts and recoveries fired this round
    pub fn notifications(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.transition != Transition::Quiet)
            .count()
    }
}

/// One synchronized pass over every target of a test item
///
/// Each target is probed on its own task; [`PollRound::run`] returns only
/// after every probe has finished and its outcome has been debounced and
/// dispatched.
#[derive(Clone)]
pub struct PollRound {
    item: Arc<TestItem>,
    probe: Arc<dyn Probe>,
    state: Arc<TargetState>,
    debouncer: Debouncer,
    dispatcher: Arc<Dispatcher>,
}

impl PollRound {
    pub fn new(item: Arc<TestItem>, probe: Arc<dyn Probe>, dispatcher: Arc<Dispatcher>) -> Self {
        let debouncer = Debouncer::new(item.alert_threshold);
        Self {
            item,
            probe,
            state: Arc::new(TargetState::new()),
            debouncer,
            dispatcher,
        }
    }

    pub fn item(&self) -> &TestItem {
        &self.item
    }

    pub fn state(&self) -> &Arc<TargetState> {
        &self.state
    }

    pub async fn run(&self) -> RoundReport {
        let started = Instant::now();

        let polls = self
            .item
            .targets
            .iter()
            .map(|(address, name)| self.poll_target(address, name));
        let targets = futures::future::join_all(polls).await;

        let report = RoundReport {
            item: self.item.name.clone(),
            targets,
            elapsed: started.elapsed(),
        };

        tracing::debug!(
            item = %report.item,
            healthy = report.healthy(),
            failing = report.failing(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Round complete"
        );

        report
    }

    async fn poll_target(&self, address: &str, name: &str) -> TargetReport {
        let outcome = self.probe_isolated(address).await;

        match &outcome {
            ProbeOutcome::Success => {
                tracing::info!(item = %self.item.name, target = %name, %address, "OK");
            }
            ProbeOutcome::Failure(reason) => {
                tracing::warn!(item = %self.item.name, target = %name, %address, %reason, "Probe failed");
            }
        }

        // The state lock is released before any notification I/O.
        let step = self.debouncer.observe(&self.state, address, &outcome);

        let alert = match step.transition {
            Transition::Quiet => None,
            Transition::Alert => Some(Alert::down(
                &self.item.name,
                name,
                address,
                outcome.reason().unwrap_or_default(),
                step.streak,
            )),
            Transition::Recover => Some(Alert::recovered(
                &self.item.name,
                name,
                address,
                step.previous,
            )),
        };
        if let Some(alert) = alert {
            self.dispatcher.dispatch(&alert).await;
        }

        TargetReport {
            address: address.to_string(),
            name: name.to_string(),
            outcome,
            streak: step.streak,
            transition: step.transition,
        }
    }

    /// Run the probe on its own task so a panicking probe counts as a failure
    async fn probe_isolated(&self, address: &str) -> ProbeOutcome {
        let probe = Arc::clone(&self.probe);
        let target = address.to_string();

        match tokio::spawn(async move { probe.probe(&target).await }).await {
            Ok(outcome) => outcome,
            Err(e) => ProbeOutcome::Failure(format!("probe task failed: {}", e)),
        }
    }
}
