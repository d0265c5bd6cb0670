//! Desktop simulator for the wifimgr connection state machine.
//!
//! Runs the manager against a deterministic in-memory radio so the
//! scan/select/connect/fallback flow can be watched without hardware:
//!
//! ```text
//! wifimgr-sim --network Home:hunter2 --visible Home:-48 --visible Cafe:-30
//! wifimgr-sim --network Home:hunter2 --ap setup-portal --mode rescue
//! ```

mod radio;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;
use std::time::Duration;

use radio::{SimRadio, VirtualAp};
use wifimgr::{AccessPointProfile, ApMode, NetworkProfile, WifiManager, runner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Station only; never start the local access point.
    Off,
    /// Access point only; no station attempts.
    Alone,
    /// Access point alongside station attempts.
    Both,
    /// All radio activity disabled.
    RadioOff,
    /// Start the access point only after station attempts fail.
    Rescue,
}

impl From<ModeArg> for ApMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Off => ApMode::Off,
            ModeArg::Alone => ApMode::AloneOnly,
            ModeArg::Both => ApMode::Both,
            ModeArg::RadioOff => ApMode::RadioOff,
            ModeArg::Rescue => ApMode::OnlyIfStationUnavailable,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "wifimgr-sim", about = "Simulate the wifimgr state machine")]
struct Args {
    /// Known network, highest priority first; SSID or SSID:PASSPHRASE.
    #[arg(long = "network", value_name = "SSID[:PASS]")]
    networks: Vec<String>,

    /// Fallback access point profile; SSID or SSID:PASSPHRASE.
    #[arg(long, value_name = "SSID[:PASS]")]
    ap: Option<String>,

    /// Access point observed in the simulated airwaves, as SSID:RSSI.
    #[arg(long = "visible", value_name = "SSID:RSSI")]
    visible: Vec<String>,

    /// Access-point fallback policy.
    #[arg(long, value_enum, default_value = "rescue")]
    mode: ModeArg,

    /// Tick period in milliseconds.
    #[arg(long, default_value_t = 200)]
    tick_ms: u64,

    /// Maximum time in the connecting state, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    connect_timeout_ms: u64,

    /// Idle time between failed attempts, in milliseconds. Much shorter
    /// than the library default so the retry loop is watchable.
    #[arg(long, default_value_t = 2_000)]
    reconnect_ms: u64,

    /// Give up after this many ticks.
    #[arg(long, default_value_t = 100)]
    max_ticks: u32,
}

fn split_credentials(spec: &str) -> (String, Option<&str>) {
    match spec.split_once(':') {
        Some((ssid, pass)) => (ssid.to_string(), Some(pass)),
        None => (spec.to_string(), None),
    }
}

fn parse_visible(spec: &str) -> Result<VirtualAp> {
    let Some((ssid, rssi)) = spec.split_once(':') else {
        bail!("--visible expects SSID:RSSI, got \"{spec}\"");
    };
    let rssi: i32 = rssi
        .parse()
        .with_context(|| format!("invalid RSSI in \"{spec}\""))?;
    Ok(VirtualAp {
        ssid: ssid.to_string(),
        rssi,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let airwaves = args
        .visible
        .iter()
        .map(|s| parse_visible(s))
        .collect::<Result<Vec<_>>>()?;

    let mut wifi = WifiManager::new(SimRadio::new(airwaves));
    wifi.set_ap_mode(args.mode.into());
    wifi.set_scan(true);
    wifi.set_connect_timeout(Duration::from_millis(args.connect_timeout_ms));
    wifi.set_reconnect_timeout(Duration::from_millis(args.reconnect_ms));

    for spec in &args.networks {
        let (ssid, pass) = split_credentials(spec);
        wifi.add_network(NetworkProfile::new(ssid, pass))
            .with_context(|| format!("registering \"{spec}\""))?;
    }
    if let Some(spec) = &args.ap {
        let (ssid, pass) = split_credentials(spec);
        wifi.set_access_point(AccessPointProfile::new(ssid, pass))
            .context("configuring access point")?;
    }

    wifi.subscribe(|message, param| match param {
        Some(param) => println!("[event] {message}: {param}"),
        None => println!("[event] {message}"),
    });

    let max_ticks = args.max_ticks;
    let mut ticks = 0u32;
    runner::drive(&mut wifi, Duration::from_millis(args.tick_ms), |m| {
        ticks += 1;
        ticks >= max_ticks || m.is_connected() || m.ap_started()
    })
    .await;

    info!("Simulation finished after {ticks} tick(s)");
    if wifi.is_connected() {
        println!(
            "Station link up: {}",
            wifi.current_ssid().unwrap_or_default()
        );
    } else if wifi.ap_started() {
        println!(
            "Fallback access point up: {}",
            wifi.ap_ssid().unwrap_or_default()
        );
    } else {
        println!("No connectivity after {ticks} tick(s) (state: {})", wifi.state());
    }

    Ok(())
}
