//! A tick-driven Wi-Fi station/access-point connection manager.
//!
//! This crate drives the connection lifecycle on top of a host-provided
//! radio driver: it tries a prioritized list of known networks, falls back
//! to a local access point when none are reachable, and recovers
//! automatically from disconnects.
//!
//! - Ordered registry of known networks plus an optional fallback AP profile
//! - Pure, unit-testable selection policy ranking scan results by signal
//! - Cooperative state machine advanced one step per [`WifiManager::tick`]
//! - Synchronous, ordered lifecycle notifications to any number of subscribers
//!
//! The radio itself (association, scanning, AP broadcast) lives behind the
//! [`WifiDriver`] trait; the manager never blocks and never spawns threads,
//! so it fits a bare-metal superloop as well as an async task.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use wifimgr::{ApMode, NetworkProfile, WifiManager};
//! # use wifimgr::{Addressing, LinkStatus, ScanOutcome, WifiDriver};
//! # struct Radio;
//! # impl WifiDriver for Radio {
//! #     fn request_scan(&mut self) {}
//! #     fn poll_scan(&mut self) -> ScanOutcome { ScanOutcome::InProgress }
//! #     fn begin_station_connect(&mut self, _: &str, _: Option<&str>, _: &Addressing) {}
//! #     fn station_link_status(&mut self) -> LinkStatus { LinkStatus::Idle }
//! #     fn station_disconnect(&mut self) {}
//! #     fn start_access_point(&mut self, _: &str, _: Option<&str>, _: &Addressing) -> bool { true }
//! #     fn set_hostname(&mut self, _: &str) -> bool { true }
//! #     fn power_radio(&mut self, _: bool) {}
//! # }
//!
//! # fn main() -> wifimgr::Result<()> {
//! let mut wifi = WifiManager::new(Radio);
//! wifi.set_ap_mode(ApMode::OnlyIfStationUnavailable);
//! wifi.set_scan(true);
//! wifi.add_network(NetworkProfile::new("Home", Some("hunter2")))?;
//! wifi.subscribe(|message, param| {
//!     println!("{message} {}", param.unwrap_or(""));
//! });
//!
//! loop {
//!     wifi.tick();
//!     std::thread::sleep(Duration::from_millis(100));
//! }
//! # }
//! ```
//!
//! # Error Handling
//!
//! Configuration calls return `Result<T, ConfigError>` synchronously.
//! Transient connectivity failures (scan failed, connect failed or timed
//! out, AP rejected) are delivered as [`Message`] events and retried
//! automatically under `reconnect_timeout`; no failure is fatal and the
//! machine always has a defined next state.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To
//! see log output, add a logging implementation like `env_logger`.

// Public API modules
pub mod constants;
pub mod driver;
pub mod events;
pub mod manager;
pub mod models;
pub mod policy;
pub mod registry;
pub mod runner;

// Re-exported public API
pub use driver::WifiDriver;
pub use events::{EventCallback, Notifier};
pub use manager::WifiManager;
pub use models::{
    AccessPointProfile, Addressing, ApMode, ConfigError, ConnectionState, LinkStatus, Message,
    NetworkProfile, ScanObservation, ScanOutcome, SecurityKind, StaticAddressing, format_bssid,
};
pub use policy::Candidate;
pub use registry::NetworkRegistry;

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
