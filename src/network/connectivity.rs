//! Maps platform connectivity reports onto the [`NetworkStatus`] switch
//!
//! Platforms report connectivity changes as they happen. An application may
//! override the detected state, for example to force offline mode while
//! roaming; while an override is set, detected changes are recorded but do not
//! move the switch.

use super::{NetworkMode, NetworkStatus};
use std::sync::Mutex;

#[derive(Debug, Default, Clone, Copy)]
struct State {
    detected: Option<bool>,
    overridden: Option<bool>,
}

impl State {
    fn effective(&self) -> Option<bool> {
        self.overridden.or(self.detected)
    }
}

/// Detected connectivity and the application override, applied to a status
///
/// Both inputs are updated and applied under one lock, so the switch always
/// ends up matching the last effective state.
pub struct Connectivity<'a> {
    status: &'a NetworkStatus,
    state: Mutex<State>,
}

impl<'a> Connectivity<'a> {
    pub fn new(status: &'a NetworkStatus) -> Self {
        Self {
            status,
            state: Mutex::new(State::default()),
        }
    }

    /// Platform callback for a detected connectivity change
    pub fn on_connectivity_changed(&self, connected: bool) {
        let Ok(mut state) = self.state.lock() else {
            log::error!("connectivity state poisoned, change to {} dropped", connected);
            return;
        };
        state.detected = Some(connected);
        if state.overridden.is_none() {
            self.apply(connected);
        } else {
            log::debug!("connectivity change to {} ignored, override active", connected);
        }
    }

    /// Force connectivity to `Some(state)`, or clear the override with `None`
    pub fn set_connected(&self, connected: Option<bool>) {
        let Ok(mut state) = self.state.lock() else {
            log::error!("connectivity state poisoned, override {:?} dropped", connected);
            return;
        };
        state.overridden = connected;
        if let Some(connected) = state.effective() {
            self.apply(connected);
        }
    }

    pub fn override_state(&self) -> Option<bool> {
        self.state.lock().ok().and_then(|state| state.overridden)
    }

    /// Effective connectivity: the override if set, else the last detected state
    pub fn is_connected(&self) -> Option<bool> {
        self.state.lock().ok().and_then(|state| state.effective())
    }

    fn apply(&self, connected: bool) {
        let mode = if connected {
            NetworkMode::Online
        } else {
            NetworkMode::Offline
        };
        self.status.set(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_changes_drive_mode() {
        let status = NetworkStatus::new();
        let connectivity = Connectivity::new(&status);
        assert_eq!(connectivity.is_connected(), None);

        connectivity.on_connectivity_changed(false);
        assert_eq!(status.get(), NetworkMode::Offline);

        connectivity.on_connectivity_changed(true);
        assert_eq!(status.get(), NetworkMode::Online);
    }

    #[test]
    fn test_override_wins_until_cleared() {
        let status = NetworkStatus::new();
        let connectivity = Connectivity::new(&status);

        connectivity.set_connected(Some(false));
        connectivity.on_connectivity_changed(true);
        assert_eq!(status.get(), NetworkMode::Offline);
        assert_eq!(connectivity.is_connected(), Some(false));

        connectivity.set_connected(None);
        assert_eq!(connectivity.is_connected(), Some(true));
        assert_eq!(status.get(), NetworkMode::Online);
    }

    #[test]
    fn test_override_holds_against_concurrent_changes() {
        let status = NetworkStatus::new();
        let connectivity = Connectivity::new(&status);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        connectivity.on_connectivity_changed(true);
                    }
                });
            }
            scope.spawn(|| connectivity.set_connected(Some(false)));
        });

        assert_eq!(connectivity.override_state(), Some(false));
        assert_eq!(connectivity.is_connected(), Some(false));
        assert_eq!(status.get(), NetworkMode::Offline);
    }
}
