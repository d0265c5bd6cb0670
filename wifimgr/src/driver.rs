//! Radio driver abstraction.
//!
//! The manager never talks to hardware directly; it drives everything
//! through [`WifiDriver`], which the host environment implements on top of
//! its radio stack. All operations are non-blocking: scans and station
//! connects are started with one call and observed with a poll on later
//! ticks.
//!
//! Keeping the seam as a trait also enables testing: the integration tests
//! script a mock driver through every transition of the state machine.

use crate::models::{Addressing, LinkStatus, ScanOutcome};

/// Host-environment radio primitives required by the connection manager.
pub trait WifiDriver {
    /// Requests an asynchronous scan. Must not block; results are picked up
    /// via [`poll_scan`](Self::poll_scan) on subsequent ticks.
    fn request_scan(&mut self);

    /// Reports the state of the scan requested last.
    fn poll_scan(&mut self) -> ScanOutcome;

    /// Starts a station association attempt. Must not block; progress is
    /// observed via [`station_link_status`](Self::station_link_status).
    fn begin_station_connect(
        &mut self,
        ssid: &str,
        passphrase: Option<&str>,
        addressing: &Addressing,
    );

    /// Reports the state of the station link.
    fn station_link_status(&mut self) -> LinkStatus;

    /// Tears down the station link, abandoning any in-flight attempt.
    fn station_disconnect(&mut self);

    /// Brings up the local access point. Returns whether the driver
    /// accepted the configuration.
    fn start_access_point(
        &mut self,
        ssid: &str,
        passphrase: Option<&str>,
        addressing: &Addressing,
    ) -> bool;

    /// Assigns the device hostname. Returns whether the driver accepted it.
    fn set_hostname(&mut self, name: &str) -> bool;

    /// Powers the radio up or down.
    fn power_radio(&mut self, on: bool);
}
