//! Async tick scheduling.
//!
//! The manager itself never blocks and owns no scheduler; these helpers
//! wrap it in a tokio task that calls [`WifiManager::tick`] once per
//! period. The one-step-per-call contract is preserved: each interval tick
//! advances the machine exactly one cooperative step.

use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use crate::driver::WifiDriver;
use crate::manager::WifiManager;

/// Drives the manager at a fixed cadence until the predicate returns true.
///
/// The predicate is evaluated after every tick. Missed intervals are
/// delayed rather than burst, so a slow tick never causes a catch-up storm
/// of state transitions.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
///
/// wifimgr::runner::drive(&mut manager, Duration::from_millis(100), |m| {
///     m.is_connected()
/// })
/// .await;
/// ```
pub async fn drive<D, F>(manager: &mut WifiManager<D>, period: Duration, mut until: F)
where
    D: WifiDriver,
    F: FnMut(&WifiManager<D>) -> bool,
{
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        manager.tick();
        if until(manager) {
            return;
        }
    }
}

/// Drives the manager until the station link is established.
pub async fn drive_until_connected<D: WifiDriver>(manager: &mut WifiManager<D>, period: Duration) {
    drive(manager, period, |m| m.is_connected()).await;
}
