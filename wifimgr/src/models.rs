use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use thiserror::Error;

use crate::constants::{limits, security};

/// How a network interface obtains its IP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Addressing {
    /// Address assigned by the network's DHCP server.
    Dhcp,
    /// Fixed address configuration supplied by the embedder.
    Static(StaticAddressing),
}

/// Static IPv4 configuration for a station or access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAddressing {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub dns: Option<Ipv4Addr>,
}

/// Credentials and addressing for a known station-mode network.
///
/// Profiles are held by the registry in insertion order, which doubles as
/// the default priority. SSID uniqueness is deliberately not enforced:
/// duplicate entries are legal and rank independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub ssid: String,
    pub passphrase: Option<String>,
    pub addressing: Addressing,
}

impl NetworkProfile {
    /// Creates a DHCP profile with an optional passphrase.
    pub fn new(ssid: impl Into<String>, passphrase: Option<&str>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: passphrase.map(str::to_string),
            addressing: Addressing::Dhcp,
        }
    }

    /// Replaces the addressing mode, builder style.
    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }
}

/// Configuration for the locally broadcast fallback access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointProfile {
    pub ssid: String,
    pub passphrase: Option<String>,
    pub addressing: Addressing,
}

impl AccessPointProfile {
    /// Creates a DHCP-addressed access point profile.
    pub fn new(ssid: impl Into<String>, passphrase: Option<&str>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: passphrase.map(str::to_string),
            addressing: Addressing::Dhcp,
        }
    }
}

/// Security scheme advertised by an observed access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityKind {
    Open,
    Wep,
    WpaPsk,
    Wpa2Psk,
    WpaWpa2Psk,
    Enterprise,
    /// Unknown security code not mapped to a specific variant.
    Unknown(u8),
}

impl From<u8> for SecurityKind {
    fn from(code: u8) -> Self {
        match code {
            security::OPEN => Self::Open,
            security::WEP => Self::Wep,
            security::WPA_PSK => Self::WpaPsk,
            security::WPA2_PSK => Self::Wpa2Psk,
            security::WPA_WPA2_PSK => Self::WpaWpa2Psk,
            security::ENTERPRISE => Self::Enterprise,
            v => Self::Unknown(v),
        }
    }
}

impl Display for SecurityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Wep => write!(f, "WEP"),
            Self::WpaPsk => write!(f, "WPA-PSK"),
            Self::Wpa2Psk => write!(f, "WPA2-PSK"),
            Self::WpaWpa2Psk => write!(f, "WPA/WPA2-PSK"),
            Self::Enterprise => write!(f, "WPA2-ENTERPRISE"),
            Self::Unknown(v) => write!(f, "unknown security ({v})"),
        }
    }
}

/// A single access point observed during a scan.
///
/// Carries the raw driver-reported fields; matching and ranking against the
/// registry is the selection policy's job, not the scanner's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanObservation {
    pub ssid: String,
    /// Signed signal strength; higher (less negative) = stronger.
    pub rssi: i32,
    pub security: SecurityKind,
    pub channel: u8,
    /// Hardware identifier (BSSID) of the observed access point.
    pub bssid: [u8; 6],
}

/// Result of polling an asynchronous scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The driver has not finished scanning yet.
    InProgress,
    /// The scan could not be completed.
    Failed,
    /// The scan finished but observed no access points at all.
    Empty,
    /// The scan finished with at least one observed access point.
    Ready(Vec<ScanObservation>),
}

/// Station link status as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// No association attempt in flight.
    Idle,
    /// Association/authentication still in progress.
    Connecting,
    /// Link is up.
    Connected,
    /// The driver gave up on the attempt.
    Failed,
}

impl Display for LinkStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Connection lifecycle state, mutated only by [`WifiManager::tick`].
///
/// [`WifiManager::tick`]: crate::WifiManager::tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Idle; retries are throttled by the reconnect timeout.
    NotConnected,
    /// A scan has been requested and is being polled.
    Scanning,
    /// A station connect attempt is in flight.
    Connecting,
    /// Station link is up.
    Connected,
    /// Radio powered down; only an explicit turn-on leaves this state.
    RadioOff,
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Scanning => write!(f, "scanning"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::RadioOff => write!(f, "radio off"),
        }
    }
}

/// Access-point fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApMode {
    /// Never start the local access point; station mode only.
    Off,
    /// Access point only; no station attempts are made.
    AloneOnly,
    /// Run the access point alongside station attempts.
    Both,
    /// Disable all radio activity.
    RadioOff,
    /// Start the access point only once station attempts have failed.
    OnlyIfStationUnavailable,
}

/// Lifecycle notifications delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// A scan has been requested.
    Scanning,
    /// The driver reported a scan failure.
    ScanFailed,
    /// The scan finished without observing any access point.
    NoNetworks,
    /// The selection policy picked a candidate (parameter: SSID).
    FoundNetwork,
    /// No observed access point matched a registry entry.
    NoKnownNetworks,
    /// A station connect attempt started (parameter: SSID).
    Connecting,
    /// Still waiting for the driver to resolve the attempt.
    ConnectWaiting,
    /// The attempt failed (parameter: SSID, or "timeout").
    ConnectFailed,
    /// Station link is up (parameter: SSID).
    Connected,
    /// Access point bring-up started (parameter: SSID).
    AccessPointCreating,
    /// Access point bring-up failed.
    AccessPointFailed,
    /// Access point is broadcasting (parameter: SSID).
    AccessPointCreated,
    /// The station link dropped or was forced down.
    Disconnected,
    /// Hostname was rejected (parameter: offending name).
    HostnameError,
    /// Radio is being powered down.
    TurningOff,
    /// Radio is being powered up.
    TurningOn,
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::ScanFailed => write!(f, "scan failed"),
            Self::NoNetworks => write!(f, "no networks found"),
            Self::FoundNetwork => write!(f, "network found"),
            Self::NoKnownNetworks => write!(f, "no known networks found"),
            Self::Connecting => write!(f, "connecting"),
            Self::ConnectWaiting => write!(f, "waiting for connection"),
            Self::ConnectFailed => write!(f, "connection failed"),
            Self::Connected => write!(f, "connected"),
            Self::AccessPointCreating => write!(f, "creating access point"),
            Self::AccessPointFailed => write!(f, "access point failed"),
            Self::AccessPointCreated => write!(f, "access point created"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::HostnameError => write!(f, "hostname error"),
            Self::TurningOff => write!(f, "turning radio off"),
            Self::TurningOn => write!(f, "turning radio on"),
        }
    }
}

/// Errors that can occur during configuration calls.
///
/// Configuration errors are reported synchronously and never disturb the
/// state machine; transient connectivity errors travel through the event
/// notifier instead and are retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An SSID was empty where one is required.
    #[error("SSID must not be empty")]
    EmptySsid,

    /// The registry already holds the maximum number of networks.
    #[error("network registry full (capacity {capacity})")]
    RegistryFull { capacity: usize },

    /// The requested hostname exceeds the fixed length bound.
    #[error("hostname too long ({len} bytes, max {max})")]
    HostnameTooLong { len: usize, max: usize },

    /// The driver rejected the requested hostname.
    #[error("driver rejected hostname")]
    HostnameRejected,

    /// The driver rejected the access point configuration.
    #[error("driver rejected access point configuration")]
    ApRejected,

    /// Access point bring-up was requested without a configured profile.
    #[error("no access point profile configured")]
    NoAccessPointConfigured,
}

impl ConfigError {
    /// Constructs the hostname length error against the fixed bound.
    pub(crate) fn hostname_too_long(len: usize) -> Self {
        Self::HostnameTooLong {
            len,
            max: limits::MAX_HOSTNAME_LEN,
        }
    }
}

/// Formats a BSSID as the conventional colon-separated hex string.
pub fn format_bssid(bssid: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        bssid[0], bssid[1], bssid[2], bssid[3], bssid[4], bssid[5]
    )
}
