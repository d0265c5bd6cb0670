//! The connection state machine.
//!
//! [`WifiManager`] owns the registry, the event notifier, and the driver,
//! and advances exclusively inside [`tick`](WifiManager::tick): an external
//! loop calls it at a regular cadence and every "wait" (scan in flight,
//! association in progress, retry throttling) simply returns control to the
//! caller until the next tick. No call blocks, and no internal thread or
//! timer exists; `connect_timeout` and `reconnect_timeout` are polled.
//!
//! Transient connectivity failures are reported through the notifier and
//! retried indefinitely; imposing an attempt ceiling is the embedder's
//! responsibility.

use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::Result;
use crate::constants::{defaults, limits};
use crate::driver::WifiDriver;
use crate::events::Notifier;
use crate::models::{
    AccessPointProfile, Addressing, ApMode, ConfigError, ConnectionState, LinkStatus, Message,
    NetworkProfile, ScanOutcome, format_bssid,
};
use crate::policy;
use crate::registry::NetworkRegistry;

/// Tick-driven Wi-Fi station/access-point lifecycle manager.
///
/// Construct it around a [`WifiDriver`], register known networks and an
/// optional fallback access point, subscribe to lifecycle events, and call
/// [`tick`](Self::tick) at a regular cadence.
pub struct WifiManager<D: WifiDriver> {
    driver: D,
    registry: NetworkRegistry,
    notifier: Notifier,
    state: ConnectionState,
    ap_mode: ApMode,
    scan_before_connect: bool,
    hostname: Option<String>,
    connect_timeout: Duration,
    reconnect_timeout: Duration,
    /// Throttle anchor: `None` means the next attempt may start immediately.
    last_attempt: Option<Instant>,
    /// Start of the in-flight connect attempt, while in `Connecting`.
    connect_started: Option<Instant>,
    /// SSID of the in-flight or established station link.
    current_ssid: Option<String>,
    ap_started: bool,
}

impl<D: WifiDriver> WifiManager<D> {
    /// Creates a manager in the `NotConnected` state with default timeouts.
    ///
    /// Pre-connect scanning starts disabled and the AP mode starts as
    /// [`ApMode::AloneOnly`]; embedders normally call
    /// [`set_scan`](Self::set_scan) and [`set_ap_mode`](Self::set_ap_mode)
    /// before ticking.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            registry: NetworkRegistry::new(),
            notifier: Notifier::new(),
            state: ConnectionState::NotConnected,
            ap_mode: ApMode::AloneOnly,
            scan_before_connect: false,
            hostname: None,
            connect_timeout: defaults::connect_timeout(),
            reconnect_timeout: defaults::reconnect_timeout(),
            last_attempt: None,
            connect_started: None,
            current_ssid: None,
            ap_started: false,
        }
    }

    // ---- configuration ----------------------------------------------------

    /// Registers a known network. Insertion order is the default priority.
    ///
    /// # Errors
    ///
    /// `ConfigError::EmptySsid` or `ConfigError::RegistryFull`; the registry
    /// is left untouched on error.
    pub fn add_network(&mut self, profile: NetworkProfile) -> Result<()> {
        self.registry.add(profile)
    }

    /// Discards all known networks.
    pub fn clear_networks(&mut self) {
        self.registry.clear();
    }

    /// Sets or replaces the fallback access point profile.
    pub fn set_access_point(&mut self, profile: AccessPointProfile) -> Result<()> {
        self.registry.set_access_point(profile)
    }

    /// Selects the access-point fallback policy.
    pub fn set_ap_mode(&mut self, mode: ApMode) {
        self.ap_mode = mode;
    }

    /// Enables or disables pre-connect scanning.
    ///
    /// With scanning disabled, connection attempts go directly to the first
    /// registry entry instead of ranking scan results.
    pub fn set_scan(&mut self, scan: bool) {
        self.scan_before_connect = scan;
    }

    /// Assigns the device hostname via the driver.
    ///
    /// A name longer than the fixed bound or rejected by the driver emits
    /// [`Message::HostnameError`] and leaves the previous hostname in
    /// effect; the state machine is never disturbed.
    pub fn set_hostname(&mut self, name: &str) -> Result<()> {
        if name.len() > limits::MAX_HOSTNAME_LEN {
            warn!(
                "Hostname \"{name}\" too long ({} bytes, max {})",
                name.len(),
                limits::MAX_HOSTNAME_LEN
            );
            self.notifier.emit(Message::HostnameError, Some(name));
            return Err(ConfigError::hostname_too_long(name.len()));
        }
        if !self.driver.set_hostname(name) {
            warn!("Driver rejected hostname \"{name}\"");
            self.notifier.emit(Message::HostnameError, Some(name));
            return Err(ConfigError::HostnameRejected);
        }
        self.hostname = Some(name.to_string());
        Ok(())
    }

    /// Maximum time permitted in `Connecting` before declaring failure.
    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    /// Idle time required between failed attempts.
    pub fn set_reconnect_timeout(&mut self, timeout: Duration) {
        self.reconnect_timeout = timeout;
    }

    /// Clears the retry throttle so the next tick attempts immediately.
    pub fn reset_reconnect_timeout(&mut self) {
        self.last_attempt = None;
    }

    /// Registers a lifecycle event subscriber.
    ///
    /// Subscribers are invoked synchronously and in subscription order on
    /// the same context as the tick that produced the event.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(Message, Option<&str>) + 'static,
    {
        self.notifier.subscribe(Box::new(callback));
    }

    // ---- control ----------------------------------------------------------

    /// Powers the radio down. Only [`turn_on`](Self::turn_on) leaves the
    /// resulting `RadioOff` state.
    pub fn turn_off(&mut self) {
        info!("Turning radio off");
        self.notifier.emit(Message::TurningOff, None);
        self.driver.power_radio(false);
        self.state = ConnectionState::RadioOff;
        self.current_ssid = None;
        self.connect_started = None;
        self.ap_started = false;
    }

    /// Powers the radio back up and resumes connection attempts at once.
    pub fn turn_on(&mut self) {
        info!("Turning radio on");
        self.notifier.emit(Message::TurningOn, None);
        self.driver.power_radio(true);
        self.state = ConnectionState::NotConnected;
        self.last_attempt = None;
    }

    /// Forces the station link down.
    ///
    /// The retry throttle is armed, so the manager will not immediately
    /// redo the connection it was just told to drop.
    pub fn disconnect(&mut self) {
        debug!("Forced disconnect");
        self.driver.station_disconnect();
        self.notifier.emit(Message::Disconnected, None);
        self.state = ConnectionState::NotConnected;
        self.current_ssid = None;
        self.connect_started = None;
        self.last_attempt = Some(Instant::now());
    }

    /// Forces access point bring-up regardless of the configured AP mode.
    pub fn create_ap(&mut self) -> Result<()> {
        self.ap_started = false;
        self.start_ap()
    }

    // ---- queries ----------------------------------------------------------

    /// Whether the station link is established.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Current state of the connection state machine.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Raw station link status as reported by the driver.
    pub fn link_status(&mut self) -> LinkStatus {
        self.driver.station_link_status()
    }

    /// SSID of the established or in-flight station link, if any.
    pub fn current_ssid(&self) -> Option<&str> {
        self.current_ssid.as_deref()
    }

    /// SSID of the configured fallback access point, if any.
    pub fn ap_ssid(&self) -> Option<&str> {
        self.registry.access_point().map(|p| p.ssid.as_str())
    }

    /// Whether the local access point is currently up.
    pub fn ap_started(&self) -> bool {
        self.ap_started
    }

    /// Hostname last accepted by the driver, if any.
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    /// Known networks in registration order.
    pub fn networks(&self) -> &[NetworkProfile] {
        self.registry.networks()
    }

    // ---- driving ----------------------------------------------------------

    /// Advances the state machine by one cooperative step.
    ///
    /// This is the only place state transitions happen. The embedding
    /// application must call it at a regular cadence; nothing inside ever
    /// blocks the caller.
    pub fn tick(&mut self) {
        if self.ap_mode == ApMode::RadioOff && self.state != ConnectionState::RadioOff {
            self.turn_off();
            return;
        }

        match self.state {
            ConnectionState::RadioOff => {}
            ConnectionState::NotConnected => self.tick_not_connected(),
            ConnectionState::Scanning => self.tick_scanning(),
            ConnectionState::Connecting => self.tick_connecting(),
            ConnectionState::Connected => self.tick_connected(),
        }
    }

    fn tick_not_connected(&mut self) {
        if self.throttled() {
            return;
        }

        if self.ap_mode == ApMode::AloneOnly {
            // AP only; no station attempts. Failed bring-up shares the
            // reconnect cadence so it does not retry every tick.
            if !self.ensure_ap() {
                self.last_attempt = Some(Instant::now());
            }
            return;
        }

        if self.ap_mode == ApMode::Both {
            self.ensure_ap();
        }

        if self.scan_before_connect {
            debug!("Requesting scan");
            self.notifier.emit(Message::Scanning, None);
            self.driver.request_scan();
            self.state = ConnectionState::Scanning;
            return;
        }

        // Scanning disabled: go straight for the first registered network.
        match self.registry.networks().first().cloned() {
            Some(profile) => {
                self.begin_station_attempt(profile.ssid, profile.passphrase, profile.addressing);
            }
            None => {
                warn!("No networks registered");
                self.notifier.emit(Message::NoKnownNetworks, None);
                self.station_unavailable();
            }
        }
    }

    fn tick_scanning(&mut self) {
        match self.driver.poll_scan() {
            ScanOutcome::InProgress => {}
            ScanOutcome::Failed => {
                warn!("Scan failed");
                self.notifier.emit(Message::ScanFailed, None);
                self.state = ConnectionState::NotConnected;
                self.last_attempt = Some(Instant::now());
            }
            ScanOutcome::Empty => {
                debug!("Scan finished with no access points");
                self.notifier.emit(Message::NoNetworks, None);
                self.station_unavailable();
            }
            ScanOutcome::Ready(observations) => {
                debug!("Scan finished with {} access point(s)", observations.len());
                match policy::best(&self.registry, &observations) {
                    Some(candidate) => {
                        debug!(
                            "Best candidate \"{}\" ({} dBm, channel {}, {})",
                            candidate.profile.ssid,
                            candidate.rssi,
                            candidate.channel,
                            format_bssid(&candidate.bssid)
                        );
                        self.notifier
                            .emit(Message::FoundNetwork, Some(&candidate.profile.ssid));
                        self.begin_station_attempt(
                            candidate.profile.ssid,
                            candidate.profile.passphrase,
                            candidate.profile.addressing,
                        );
                    }
                    None => {
                        warn!("No observed access point matches the registry");
                        self.notifier.emit(Message::NoKnownNetworks, None);
                        self.station_unavailable();
                    }
                }
            }
        }
    }

    fn tick_connecting(&mut self) {
        let ssid = self.current_ssid.clone();
        match self.driver.station_link_status() {
            LinkStatus::Connected => {
                info!("Connected to \"{}\"", ssid.as_deref().unwrap_or_default());
                self.notifier.emit(Message::Connected, ssid.as_deref());
                self.state = ConnectionState::Connected;
                self.connect_started = None;
                self.last_attempt = None;
            }
            LinkStatus::Failed => {
                warn!(
                    "Connection to \"{}\" failed",
                    ssid.as_deref().unwrap_or_default()
                );
                self.notifier.emit(Message::ConnectFailed, ssid.as_deref());
                self.current_ssid = None;
                self.connect_started = None;
                self.station_unavailable();
            }
            LinkStatus::Idle | LinkStatus::Connecting => {
                let started = self.connect_started.unwrap_or_else(Instant::now);
                if started.elapsed() >= self.connect_timeout {
                    warn!(
                        "Connection to \"{}\" timed out after {:?}",
                        ssid.as_deref().unwrap_or_default(),
                        self.connect_timeout
                    );
                    self.notifier.emit(Message::ConnectFailed, Some("timeout"));
                    self.current_ssid = None;
                    self.connect_started = None;
                    self.station_unavailable();
                } else {
                    // At most one waiting notification per tick.
                    self.notifier.emit(Message::ConnectWaiting, ssid.as_deref());
                }
            }
        }
    }

    fn tick_connected(&mut self) {
        if self.driver.station_link_status() != LinkStatus::Connected {
            warn!(
                "Link to \"{}\" dropped",
                self.current_ssid.as_deref().unwrap_or_default()
            );
            let ssid = self.current_ssid.take();
            self.notifier.emit(Message::Disconnected, ssid.as_deref());
            self.state = ConnectionState::NotConnected;
            // Recovery is prompt: the throttle stays clear so the next tick
            // retries immediately instead of idling a full reconnect window.
            self.last_attempt = None;
        }
    }

    // ---- internals --------------------------------------------------------

    fn throttled(&self) -> bool {
        match self.last_attempt {
            Some(at) => at.elapsed() < self.reconnect_timeout,
            None => false,
        }
    }

    /// Starts a station connect attempt and enters `Connecting`.
    fn begin_station_attempt(
        &mut self,
        ssid: String,
        passphrase: Option<String>,
        addressing: Addressing,
    ) {
        debug!("Connecting to \"{ssid}\"");
        self.driver
            .begin_station_connect(&ssid, passphrase.as_deref(), &addressing);
        self.notifier.emit(Message::Connecting, Some(&ssid));
        self.current_ssid = Some(ssid);
        self.connect_started = Some(Instant::now());
        self.last_attempt = Some(Instant::now());
        self.state = ConnectionState::Connecting;
    }

    /// Station connectivity cannot proceed: returns to `NotConnected` with
    /// the throttle armed, then applies the AP fallback policy.
    fn station_unavailable(&mut self) {
        self.state = ConnectionState::NotConnected;
        self.last_attempt = Some(Instant::now());
        match self.ap_mode {
            ApMode::AloneOnly | ApMode::Both | ApMode::OnlyIfStationUnavailable => {
                self.ensure_ap();
            }
            ApMode::Off | ApMode::RadioOff => {}
        }
    }

    /// Brings the access point up once; later calls are no-ops until it is
    /// torn down again.
    fn ensure_ap(&mut self) -> bool {
        if self.ap_started {
            return true;
        }
        self.start_ap().is_ok()
    }

    fn start_ap(&mut self) -> Result<()> {
        let Some(profile) = self.registry.access_point().cloned() else {
            warn!("No access point profile configured");
            self.notifier.emit(Message::AccessPointFailed, None);
            return Err(ConfigError::NoAccessPointConfigured);
        };

        self.notifier
            .emit(Message::AccessPointCreating, Some(&profile.ssid));
        let accepted = self.driver.start_access_point(
            &profile.ssid,
            profile.passphrase.as_deref(),
            &profile.addressing,
        );
        if accepted {
            info!("Access point \"{}\" up", profile.ssid);
            self.notifier
                .emit(Message::AccessPointCreated, Some(&profile.ssid));
            self.ap_started = true;
            Ok(())
        } else {
            warn!("Driver rejected access point \"{}\"", profile.ssid);
            self.notifier
                .emit(Message::AccessPointFailed, Some(&profile.ssid));
            Err(ConfigError::ApRejected)
        }
    }
}

impl<D: WifiDriver> std::fmt::Debug for WifiManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiManager")
            .field("state", &self.state)
            .field("ap_mode", &self.ap_mode)
            .field("scan_before_connect", &self.scan_before_connect)
            .field("networks", &self.registry.len())
            .field("ap_started", &self.ap_started)
            .finish()
    }
}
