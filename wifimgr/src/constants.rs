//! Constants for timeouts, capacity bounds, and driver security codes.

/// Default timer values.
pub mod defaults {
    use std::time::Duration;

    pub const CONNECT_TIMEOUT_MS: u64 = 10_000;
    pub const RECONNECT_TIMEOUT_MS: u64 = 60_000;

    /// Maximum time permitted in the connecting state before giving up.
    pub fn connect_timeout() -> Duration {
        Duration::from_millis(CONNECT_TIMEOUT_MS)
    }

    /// Idle time permitted between connection attempts.
    pub fn reconnect_timeout() -> Duration {
        Duration::from_millis(RECONNECT_TIMEOUT_MS)
    }
}

/// Capacity and length bounds.
pub mod limits {
    /// Maximum number of entries the network registry accepts.
    pub const MAX_KNOWN_NETWORKS: usize = 16;

    /// Maximum hostname length in bytes.
    pub const MAX_HOSTNAME_LEN: usize = 20;
}

/// Driver security codes, as reported in scan results.
pub mod security {
    pub const OPEN: u8 = 0;
    pub const WEP: u8 = 1;
    pub const WPA_PSK: u8 = 2;
    pub const WPA2_PSK: u8 = 3;
    pub const WPA_WPA2_PSK: u8 = 4;
    pub const ENTERPRISE: u8 = 5;
}
