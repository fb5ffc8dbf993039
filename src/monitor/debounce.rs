//! Edge-triggered alert debouncing
//!
//! Per target the state is just the failure streak `s`; with threshold `T`:
//!
//! - failure: `s' = s + 1`; alert when `s'` reaches `T` exactly. With
//!   `T = 0` every failure alerts.
//! - success: recovery notice if the streak had alerted (`s > 0 && s >= T`),
//!   then `s' = 0`.

use super::state::TargetState;
use crate::probe::ProbeOutcome;

/// What a single outcome means for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to send
    Quiet,
    /// Streak reached the threshold
    Alert,
    /// First success after an alerted streak
    Recover,
}

/// Result of feeding one outcome to the debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Streak before this outcome
    pub previous: u32,
    /// Streak after this outcome
    pub streak: u32,
    pub transition: Transition,
}

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    threshold: u32,
}

impl Debouncer {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Pure transition function
    pub fn step(&self, streak: u32, success: bool) -> Step {
        if success {
            let alerted = streak > 0 && streak >= self.threshold;
            Step {
                previous: streak,
                streak: 0,
                transition: if alerted {
                    Transition::Recover
                } else {
                    Transition::Quiet
                },
            }
        } else {
            let next = streak.saturating_add(1);
            // A saturated streak stays at the threshold without crossing it again.
            let alert =
                self.threshold == 0 || (next == self.threshold && streak < self.threshold);
            Step {
                previous: streak,
                streak: next,
                transition: if alert {
                    Transition::Alert
                } else {
                    Transition::Quiet
                },
            }
        }
    }

    /// Apply an outcome to `address` in `state` under its lock
    pub fn observe(&self, state: &TargetState, address: &str, outcome: &ProbeOutcome) -> Step {
        let success = outcome.is_success();
        state.update(address, |streak| {
            let step = self.step(streak, success);
            (step.streak, step)
        })
    }
}
