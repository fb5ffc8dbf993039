//! Test doubles shared by the unit tests

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::alerts::{Notifier, NotifierError};
use crate::config::{Scheme, TestItem};
use crate::probe::{FailOn, Probe, ProbeOutcome, TlsConfig};

pub fn test_item(name: &str, targets: &[(&str, &str)], alert_threshold: u32) -> TestItem {
    TestItem {
        name: name.to_string(),
        path: "/health".to_string(),
        scheme: Scheme::Http,
        targets: targets
            .iter()
            .map(|(address, display)| (address.to_string(), display.to_string()))
            .collect::<BTreeMap<_, _>>(),
        request_timeout: Duration::from_secs(1),
        interval: Duration::from_millis(50),
        alert_threshold,
        tls: TlsConfig::default(),
        fail_on: FailOn::ClientError,
    }
}

/// Probe that replays per-address outcome scripts; unscripted calls succeed
#[derive(Default)]
pub struct ScriptedProbe {
    scripts: Mutex<HashMap<String, VecDeque<ProbeOutcome>>>,
    delays: HashMap<String, Duration>,
    panics: HashSet<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, address: &str, outcomes: Vec<ProbeOutcome>) -> Self {
        self.scripts
            .lock()
            .insert(address.to_string(), outcomes.into_iter().collect());
        self
    }

    pub fn delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    pub fn panic_on(mut self, address: &str) -> Self {
        self.panics.insert(address.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, address: &str) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics.contains(address) {
            panic!("scripted panic for {}", address);
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }
        let outcome = self
            .scripts
            .lock()
            .get_mut(address)
            .and_then(|script| script.pop_front())
            .unwrap_or(ProbeOutcome::Success);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Notifier that keeps every message it is given
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &str) -> Result<(), NotifierError> {
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}

pub fn failure(reason: &str) -> ProbeOutcome {
    ProbeOutcome::Failure(reason.to_string())
}
