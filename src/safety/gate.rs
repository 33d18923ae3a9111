//! Safe/unsafe operating mode decision.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::SecurityConfig;

/// Snapshot of everything the gate needs to answer a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyState {
    authentication_enabled: bool,
    unsecured_access_validated: bool,
    allowed_paths: HashSet<String>,
}

impl SafetyState {
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            authentication_enabled: config.authentication_enabled,
            unsecured_access_validated: config.unsecured_access_validated.unwrap_or(false),
            allowed_paths: config.unsafe_allowed_paths.iter().cloned().collect(),
        }
    }

    pub fn is_safe(&self) -> bool {
        self.authentication_enabled || self.unsecured_access_validated
    }

    /// Whether `path` may reach normal dispatch under this state.
    pub fn admits(&self, path: &str) -> bool {
        self.is_safe() || self.allowed_paths.contains(path)
    }
}

/// Process-scoped holder of the current [`SafetyState`].
pub struct SafetyGate {
    state: ArcSwap<SafetyState>,
}

impl SafetyGate {
    pub fn new(config: &SecurityConfig) -> Self {
        let state = SafetyState::from_config(config);
        if !state.is_safe() {
            tracing::warn!("Server is running in a potentially unsafe mode");
        }
        Self {
            state: ArcSwap::from_pointee(state),
        }
    }

    pub fn is_safe(&self) -> bool {
        self.state.load().is_safe()
    }

    /// Current snapshot. One request should decide against a single snapshot.
    pub fn snapshot(&self) -> Arc<SafetyState> {
        self.state.load_full()
    }

    /// Re-derive the state from a reloaded configuration.
    pub fn reload(&self, config: &SecurityConfig) {
        let next = SafetyState::from_config(config);
        let previous = self.state.swap(Arc::new(next.clone()));
        if previous.is_safe() != next.is_safe() {
            tracing::info!(safe = next.is_safe(), "Safety mode changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(auth: bool, validated: Option<bool>) -> SecurityConfig {
        SecurityConfig {
            authentication_enabled: auth,
            unsecured_access_validated: validated,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn test_safety_truth_table() {
        assert!(SafetyState::from_config(&security(true, None)).is_safe());
        assert!(SafetyState::from_config(&security(true, Some(false))).is_safe());
        assert!(SafetyState::from_config(&security(false, Some(true))).is_safe());
        assert!(!SafetyState::from_config(&security(false, Some(false))).is_safe());
        assert!(!SafetyState::from_config(&security(false, None)).is_safe());
    }

    #[test]
    fn test_allow_list_is_exact() {
        let state = SafetyState::from_config(&security(false, None));
        assert!(state.admits("/debug/server-id"));
        assert!(!state.admits("/debug/server-id/"));
        assert!(!state.admits("/debug/server-id-extra"));
        assert!(!state.admits("/databases/shop/docs"));
    }

    #[test]
    fn test_reload_swaps_state() {
        let gate = SafetyGate::new(&security(false, None));
        let before = gate.snapshot();
        assert!(!gate.is_safe());

        gate.reload(&security(false, Some(true)));
        assert!(gate.is_safe());
        // Earlier snapshots are unaffected by the swap.
        assert!(!before.is_safe());
    }

    #[test]
    fn test_concurrent_reload_never_tears() {
        let gate = Arc::new(SafetyGate::new(&security(false, None)));
        let writer = {
            let gate = gate.clone();
            std::thread::spawn(move || {
                for i in 0..1000 {
                    gate.reload(&security(i % 2 == 0, None));
                }
            })
        };
        for _ in 0..1000 {
            let state = gate.snapshot();
            assert_eq!(state.is_safe(), state.authentication_enabled);
            assert!(state.admits("/debug/server-id"));
        }
        writer.join().unwrap();
    }
}
