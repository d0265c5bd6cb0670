//! Ordered collection of known network credentials.
//!
//! Insertion order is the default priority: when scan ranking ties on
//! signal strength, the earlier-registered entry wins. Duplicate SSIDs are
//! legal and become independent candidates.

use log::debug;

use crate::Result;
use crate::constants::limits;
use crate::models::{AccessPointProfile, ConfigError, NetworkProfile};

/// Known station networks plus the optional fallback access point profile.
#[derive(Debug, Default)]
pub struct NetworkRegistry {
    networks: Vec<NetworkProfile>,
    access_point: Option<AccessPointProfile>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a known network.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySsid` for an empty SSID and
    /// `ConfigError::RegistryFull` once the capacity bound is reached.
    pub fn add(&mut self, profile: NetworkProfile) -> Result<()> {
        if profile.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if self.networks.len() >= limits::MAX_KNOWN_NETWORKS {
            return Err(ConfigError::RegistryFull {
                capacity: limits::MAX_KNOWN_NETWORKS,
            });
        }
        debug!("Registered network \"{}\"", profile.ssid);
        self.networks.push(profile);
        Ok(())
    }

    /// Discards all known networks unconditionally.
    pub fn clear(&mut self) {
        debug!("Cleared {} registered network(s)", self.networks.len());
        self.networks.clear();
    }

    /// Sets or replaces the fallback access point profile.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySsid` for an empty SSID; the previous
    /// profile is left in place.
    pub fn set_access_point(&mut self, profile: AccessPointProfile) -> Result<()> {
        if profile.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        debug!("Access point profile set to \"{}\"", profile.ssid);
        self.access_point = Some(profile);
        Ok(())
    }

    /// The configured fallback access point, if any.
    pub fn access_point(&self) -> Option<&AccessPointProfile> {
        self.access_point.as_ref()
    }

    /// Known networks in registration (priority) order.
    pub fn networks(&self) -> &[NetworkProfile] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}
