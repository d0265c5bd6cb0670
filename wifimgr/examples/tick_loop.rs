//! Minimal synchronous tick loop against a stub radio.
//!
//! Real embedders implement `WifiDriver` on their radio stack; the stub
//! here only shows the wiring.

use std::time::Duration;
use wifimgr::{Addressing, ApMode, LinkStatus, NetworkProfile, ScanOutcome, WifiDriver, WifiManager};

struct StubRadio;

impl WifiDriver for StubRadio {
    fn request_scan(&mut self) {}
    fn poll_scan(&mut self) -> ScanOutcome {
        ScanOutcome::Empty
    }
    fn begin_station_connect(&mut self, _: &str, _: Option<&str>, _: &Addressing) {}
    fn station_link_status(&mut self) -> LinkStatus {
        LinkStatus::Idle
    }
    fn station_disconnect(&mut self) {}
    fn start_access_point(&mut self, _: &str, _: Option<&str>, _: &Addressing) -> bool {
        false
    }
    fn set_hostname(&mut self, _: &str) -> bool {
        true
    }
    fn power_radio(&mut self, _: bool) {}
}

fn main() -> wifimgr::Result<()> {
    let mut wifi = WifiManager::new(StubRadio);
    wifi.set_ap_mode(ApMode::Off);
    wifi.set_scan(true);
    wifi.add_network(NetworkProfile::new("Home", Some("hunter2")))?;
    wifi.subscribe(|message, param| {
        println!("{message} {}", param.unwrap_or(""));
    });

    for _ in 0..10 {
        wifi.tick();
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}
