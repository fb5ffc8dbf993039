use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

/// Failure streaks per target address for one test item
///
/// Probes of one round run concurrently and all write here, so every
/// insert-if-absent and read-modify-write happens under the one lock.
#[derive(Debug, Default)]
pub struct TargetState {
    streaks: Mutex<HashMap<String, u32>>,
}

impl TargetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to the streak of `address` atomically.
    ///
    /// An address seen for the first time starts at 0. `f` returns the new
    /// streak plus a value passed back to the caller.
    pub fn update<R>(&self, address: &str, f: impl FnOnce(u32) -> (u32, R)) -> R {
        let mut streaks = self.streaks.lock();
        let streak = streaks.entry(address.to_string()).or_insert(0);
        let (next, result) = f(*streak);
        *streak = next;
        result
    }

    /// Current streak, `None` if the address was never observed
    pub fn streak(&self, address: &str) -> Option<u32> {
        self.streaks.lock().get(address).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.streaks
            .lock()
            .iter()
            .map(|(address, streak)| (address.clone(), *streak))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.streaks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_observation_starts_at_zero() {
        let state = TargetState::new();
        assert_eq!(state.streak("a"), None);

        let seen = state.update("a", |streak| (streak + 1, streak));
        assert_eq!(seen, 0);
        assert_eq!(state.streak("a"), Some(1));
    }

    #[test]
    fn test_keys_are_independent() {
        let state = TargetState::new();
        state.update("a", |s| (s + 1, ()));
        state.update("a", |s| (s + 1, ()));
        state.update("b", |_| (0, ()));

        let snapshot = state.snapshot();
        assert_eq!(snapshot["a"], 2);
        assert_eq!(snapshot["b"], 0);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let state = Arc::new(TargetState::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        state.update("shared", |s| (s + 1, ()));
                        state.update(&format!("own-{}", t), |s| (s + 1, ()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.streak("shared"), Some(8000));
        for t in 0..8 {
            assert_eq!(state.streak(&format!("own-{}", t)), Some(1000));
        }
    }
}
