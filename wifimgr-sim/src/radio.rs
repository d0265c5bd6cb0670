//! A deterministic in-memory radio.
//!
//! Scans and association attempts resolve after a fixed number of polls, so
//! every state machine transition is observable at the tick cadence.

use log::{debug, info};
use wifimgr::{Addressing, LinkStatus, ScanObservation, ScanOutcome, SecurityKind, WifiDriver};

/// An access point present in the simulated airwaves.
#[derive(Debug, Clone)]
pub struct VirtualAp {
    pub ssid: String,
    pub rssi: i32,
}

/// Radio whose airwaves are fixed at construction time.
///
/// Station connects succeed iff the target SSID is in the airwaves.
pub struct SimRadio {
    airwaves: Vec<VirtualAp>,
    scan_polls_left: Option<u8>,
    connect_target: Option<String>,
    connect_polls_left: u8,
    link: LinkStatus,
}

const SCAN_POLLS: u8 = 2;
const CONNECT_POLLS: u8 = 3;

impl SimRadio {
    pub fn new(airwaves: Vec<VirtualAp>) -> Self {
        Self {
            airwaves,
            scan_polls_left: None,
            connect_target: None,
            connect_polls_left: 0,
            link: LinkStatus::Idle,
        }
    }

    fn observations(&self) -> Vec<ScanObservation> {
        self.airwaves
            .iter()
            .enumerate()
            .map(|(i, ap)| ScanObservation {
                ssid: ap.ssid.clone(),
                rssi: ap.rssi,
                security: SecurityKind::Wpa2Psk,
                channel: 1 + (i as u8 % 11),
                bssid: [0x02, 0x00, 0x00, 0x00, 0x00, i as u8],
            })
            .collect()
    }
}

impl WifiDriver for SimRadio {
    fn request_scan(&mut self) {
        debug!("radio: scan requested");
        self.scan_polls_left = Some(SCAN_POLLS);
    }

    fn poll_scan(&mut self) -> ScanOutcome {
        match self.scan_polls_left {
            None => ScanOutcome::InProgress,
            Some(0) => {
                self.scan_polls_left = None;
                if self.airwaves.is_empty() {
                    ScanOutcome::Empty
                } else {
                    ScanOutcome::Ready(self.observations())
                }
            }
            Some(n) => {
                self.scan_polls_left = Some(n - 1);
                ScanOutcome::InProgress
            }
        }
    }

    fn begin_station_connect(
        &mut self,
        ssid: &str,
        _passphrase: Option<&str>,
        _addressing: &Addressing,
    ) {
        debug!("radio: association with \"{ssid}\" started");
        self.connect_target = Some(ssid.to_string());
        self.connect_polls_left = CONNECT_POLLS;
        self.link = LinkStatus::Connecting;
    }

    fn station_link_status(&mut self) -> LinkStatus {
        if self.link == LinkStatus::Connecting {
            if self.connect_polls_left > 0 {
                self.connect_polls_left -= 1;
            } else {
                let reachable = self
                    .connect_target
                    .as_deref()
                    .is_some_and(|t| self.airwaves.iter().any(|ap| ap.ssid == t));
                self.link = if reachable {
                    LinkStatus::Connected
                } else {
                    LinkStatus::Failed
                };
            }
        }
        self.link
    }

    fn station_disconnect(&mut self) {
        self.connect_target = None;
        self.link = LinkStatus::Idle;
    }

    fn start_access_point(
        &mut self,
        ssid: &str,
        _passphrase: Option<&str>,
        _addressing: &Addressing,
    ) -> bool {
        info!("radio: access point \"{ssid}\" broadcasting");
        true
    }

    fn set_hostname(&mut self, name: &str) -> bool {
        debug!("radio: hostname set to \"{name}\"");
        true
    }

    fn power_radio(&mut self, on: bool) {
        info!("radio: power {}", if on { "on" } else { "off" });
        if !on {
            self.connect_target = None;
            self.link = LinkStatus::Idle;
        }
    }
}
