//! Process-wide online/offline switch consulted by every tile request
//!
//! The current mode is a single atomic value. Reads and writes never block and
//! never tear. A request reads the mode once, when it is issued; flipping the
//! mode later does not touch requests that are already in flight.

pub mod connectivity;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Whether server requests may go out over the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum NetworkMode {
    /// Network and cache are both available
    #[default]
    Online = 0,
    /// Only requests the local cache can answer succeed
    Offline = 1,
}

/// Status enumeration of the tile fetch subsystem. Its raw values are the same
/// ABI as [`NetworkMode`]; callers convert between the two by raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FetchStatus {
    Online = 0,
    Offline = 1,
}

const _: () = assert!(NetworkMode::Online as i32 == FetchStatus::Online as i32);
const _: () = assert!(NetworkMode::Offline as i32 == FetchStatus::Offline as i32);

impl NetworkMode {
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Decode a raw value; anything that is not `Offline` reads as `Online`
    pub const fn from_raw(raw: i32) -> Self {
        if raw == Self::Offline as i32 {
            Self::Offline
        } else {
            Self::Online
        }
    }

    pub fn allows_network(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl From<FetchStatus> for NetworkMode {
    fn from(status: FetchStatus) -> Self {
        Self::from_raw(status as i32)
    }
}

impl From<NetworkMode> for FetchStatus {
    fn from(mode: NetworkMode) -> Self {
        match mode {
            NetworkMode::Online => FetchStatus::Online,
            NetworkMode::Offline => FetchStatus::Offline,
        }
    }
}

impl TryFrom<i32> for NetworkMode {
    type Error = crate::Error;

    fn try_from(raw: i32) -> crate::Result<Self> {
        match raw {
            0 => Ok(Self::Online),
            1 => Ok(Self::Offline),
            other => Err(crate::Error::InvalidValue(format!(
                "unknown network mode {other}"
            ))),
        }
    }
}

static GLOBAL_STATUS: Lazy<Arc<NetworkStatus>> = Lazy::new(|| Arc::new(NetworkStatus::new()));

/// Holder of the current [`NetworkMode`]
///
/// The engine uses [`NetworkStatus::global`]; components take a
/// `&NetworkStatus` or an `Arc<NetworkStatus>` so tests can hand them a fresh
/// instance.
#[derive(Debug, Default)]
pub struct NetworkStatus {
    mode: AtomicI32,
}

impl NetworkStatus {
    /// A new registry, starting `Online`
    pub const fn new() -> Self {
        Self {
            mode: AtomicI32::new(NetworkMode::Online as i32),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static NetworkStatus {
        &GLOBAL_STATUS
    }

    /// Shared handle to the process-wide registry
    pub fn shared() -> Arc<NetworkStatus> {
        Arc::clone(&GLOBAL_STATUS)
    }

    pub fn get(&self) -> NetworkMode {
        NetworkMode::from_raw(self.mode.load(Ordering::Acquire))
    }

    /// Store `mode`. Setting the current value changes nothing.
    pub fn set(&self, mode: NetworkMode) {
        let previous = NetworkMode::from_raw(self.mode.swap(mode.as_raw(), Ordering::AcqRel));
        if previous != mode {
            log::info!("network mode changed: {:?} -> {:?}", previous, mode);
        }
    }

    pub fn is_online(&self) -> bool {
        self.get().allows_network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_online() {
        assert_eq!(NetworkStatus::new().get(), NetworkMode::Online);
        assert_eq!(NetworkMode::default(), NetworkMode::Online);
    }

    #[test]
    fn test_set_then_get() {
        let status = NetworkStatus::new();
        status.set(NetworkMode::Offline);
        assert_eq!(status.get(), NetworkMode::Offline);
        assert!(!status.is_online());

        status.set(NetworkMode::Online);
        assert_eq!(status.get(), NetworkMode::Online);
    }

    #[test]
    fn test_set_is_idempotent() {
        let status = NetworkStatus::new();
        status.set(NetworkMode::Offline);
        status.set(NetworkMode::Offline);
        assert_eq!(status.get(), NetworkMode::Offline);
    }

    #[test]
    fn test_global_and_shared_are_the_same_registry() {
        assert!(std::ptr::eq(NetworkStatus::global(), &*NetworkStatus::shared()));
    }

    #[test]
    fn test_raw_encoding_matches_fetch_status() {
        assert_eq!(NetworkMode::Online.as_raw(), 0);
        assert_eq!(NetworkMode::Offline.as_raw(), 1);
        assert_eq!(NetworkMode::from(FetchStatus::Offline), NetworkMode::Offline);
        assert_eq!(FetchStatus::from(NetworkMode::Online), FetchStatus::Online);
        assert!(NetworkMode::try_from(7).is_err());
    }

    #[test]
    fn test_concurrent_sets_never_tear() {
        let status = Arc::new(NetworkStatus::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let status = Arc::clone(&status);
                std::thread::spawn(move || {
                    let mode = if i % 2 == 0 {
                        NetworkMode::Online
                    } else {
                        NetworkMode::Offline
                    };
                    for _ in 0..1000 {
                        status.set(mode);
                        let seen = status.get();
                        assert!(seen == NetworkMode::Online || seen == NetworkMode::Offline);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        let raw = status.get().as_raw();
        assert!(raw == 0 || raw == 1);
    }
}
