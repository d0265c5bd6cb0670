//! Tests for the connection state machine.
//!
//! Every transition is exercised against the scripted mock radio; timeouts
//! are made observable by shrinking them to zero or a few milliseconds.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::{MockRadio, RadioState, messages, record_events};
use wifimgr::{
    AccessPointProfile, ApMode, ConfigError, ConnectionState, LinkStatus, Message, NetworkProfile,
    ScanObservation, ScanOutcome, SecurityKind, WifiManager,
};

fn manager() -> (WifiManager<MockRadio>, Rc<RefCell<RadioState>>) {
    let (radio, state) = MockRadio::new();
    let mut manager = WifiManager::new(radio);
    manager.set_ap_mode(ApMode::Off);
    manager.set_scan(true);
    (manager, state)
}

fn obs(ssid: &str, rssi: i32) -> ScanObservation {
    ScanObservation {
        ssid: ssid.to_string(),
        rssi,
        security: SecurityKind::Wpa2Psk,
        channel: 1,
        bssid: [2, 4, 6, 8, 10, 12],
    }
}

#[test]
fn scan_select_connect_happy_path() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", Some("x"))).unwrap();
    let events = record_events(&mut manager);

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40), obs("Neighbor", -30)]));
    state
        .borrow_mut()
        .link_statuses
        .push_back(LinkStatus::Connecting);
    state.borrow_mut().steady_link = LinkStatus::Connected;

    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Scanning);
    assert_eq!(state.borrow().scan_requests, 1);

    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Connecting);
    // The unknown but stronger "Neighbor" must not be attempted.
    assert_eq!(state.borrow().connect_attempts, ["Home"]);

    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Connecting);

    manager.tick();
    assert!(manager.is_connected());
    assert_eq!(manager.current_ssid(), Some("Home"));

    assert_eq!(
        messages(&events),
        [
            Message::Scanning,
            Message::FoundNetwork,
            Message::Connecting,
            Message::ConnectWaiting,
            Message::Connected,
        ]
    );
    assert_eq!(events.borrow().last().unwrap().1.as_deref(), Some("Home"));
}

#[test]
fn scan_in_progress_keeps_scanning() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();

    manager.tick();
    // No outcome queued: the driver keeps reporting InProgress.
    manager.tick();
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Scanning);
    assert_eq!(state.borrow().scan_requests, 1);
}

#[test]
fn scan_failure_throttles_the_retry() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    manager.set_reconnect_timeout(Duration::from_millis(50));
    let events = record_events(&mut manager);

    state.borrow_mut().scan_outcomes.push_back(ScanOutcome::Failed);

    manager.tick();
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::NotConnected);
    assert!(messages(&events).contains(&Message::ScanFailed));

    // Within the reconnect window the tick is a no-op.
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 1);

    std::thread::sleep(Duration::from_millis(60));
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 2);
}

#[test]
fn reset_reconnect_timeout_retries_at_once() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();

    state.borrow_mut().scan_outcomes.push_back(ScanOutcome::Failed);
    manager.tick();
    manager.tick();
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 1);

    manager.reset_reconnect_timeout();
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 2);
}

#[test]
fn connect_timeout_fails_the_attempt() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    manager.set_connect_timeout(Duration::ZERO);
    let events = record_events(&mut manager);

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40)]));

    manager.tick();
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Connecting);

    // Driver stays stuck; the zero timeout has elapsed by the next tick.
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::NotConnected);

    let log = events.borrow();
    let (message, param) = log.last().unwrap();
    assert_eq!(*message, Message::ConnectFailed);
    assert_eq!(param.as_deref(), Some("timeout"));
}

#[test]
fn stays_connecting_until_timeout_with_one_waiting_event_per_tick() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    let events = record_events(&mut manager);

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40)]));
    state.borrow_mut().steady_link = LinkStatus::Connecting;

    manager.tick();
    manager.tick();
    for _ in 0..3 {
        manager.tick();
    }

    // Default 10s timeout has not elapsed and the driver gave no verdict.
    assert_eq!(manager.state(), ConnectionState::Connecting);
    let waiting = messages(&events)
        .iter()
        .filter(|m| **m == Message::ConnectWaiting)
        .count();
    assert_eq!(waiting, 3);
}

#[test]
fn driver_reported_failure_returns_to_not_connected() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    let events = record_events(&mut manager);

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40)]));
    state.borrow_mut().link_statuses.push_back(LinkStatus::Failed);

    manager.tick();
    manager.tick();
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::NotConnected);

    let log = events.borrow();
    let (message, param) = log.last().unwrap();
    assert_eq!(*message, Message::ConnectFailed);
    assert_eq!(param.as_deref(), Some("Home"));

    // Failure arms the throttle (default 60s): no immediate new scan.
    drop(log);
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 1);
}

#[test]
fn link_drop_recovers_without_waiting_a_full_reconnect_window() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    let events = record_events(&mut manager);

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40)]));
    state.borrow_mut().steady_link = LinkStatus::Connected;

    manager.tick();
    manager.tick();
    manager.tick();
    assert!(manager.is_connected());

    state.borrow_mut().steady_link = LinkStatus::Idle;
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::NotConnected);
    assert!(messages(&events).contains(&Message::Disconnected));

    // Default reconnect timeout is 60s; retrying right away proves the
    // throttle was cleared on the drop.
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 2);
}

#[test]
fn direct_connect_when_scanning_is_disabled() {
    let (mut manager, state) = manager();
    manager.set_scan(false);
    manager.add_network(NetworkProfile::new("Primary", Some("pw"))).unwrap();
    manager.add_network(NetworkProfile::new("Secondary", None)).unwrap();
    let events = record_events(&mut manager);

    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Connecting);
    assert_eq!(state.borrow().connect_attempts, ["Primary"]);
    assert_eq!(state.borrow().scan_requests, 0);
    assert_eq!(messages(&events), [Message::Connecting]);
}

#[test]
fn empty_registry_reports_no_known_networks() {
    let (mut manager, state) = manager();
    manager.set_scan(false);
    let events = record_events(&mut manager);

    manager.tick();
    assert_eq!(manager.state(), ConnectionState::NotConnected);
    assert_eq!(messages(&events), [Message::NoKnownNetworks]);
    assert!(state.borrow().connect_attempts.is_empty());
}

#[test]
fn empty_scan_falls_back_to_access_point() {
    let (mut manager, state) = manager();
    manager.set_ap_mode(ApMode::OnlyIfStationUnavailable);
    manager
        .set_access_point(AccessPointProfile::new("rescue", Some("rescue-pw")))
        .unwrap();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    let events = record_events(&mut manager);

    state.borrow_mut().scan_outcomes.push_back(ScanOutcome::Empty);

    manager.tick();
    assert!(state.borrow().ap_starts.is_empty());

    manager.tick();
    assert_eq!(state.borrow().ap_starts, ["rescue"]);
    assert_eq!(
        messages(&events),
        [
            Message::Scanning,
            Message::NoNetworks,
            Message::AccessPointCreating,
            Message::AccessPointCreated,
        ]
    );
    assert!(manager.ap_started());
}

#[test]
fn only_if_unavailable_waits_for_the_station_attempt_to_fail() {
    let (mut manager, state) = manager();
    manager.set_ap_mode(ApMode::OnlyIfStationUnavailable);
    manager
        .set_access_point(AccessPointProfile::new("rescue", None))
        .unwrap();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    manager.set_connect_timeout(Duration::ZERO);

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40)]));

    manager.tick();
    manager.tick();
    // A candidate is being attempted: the AP must not start yet.
    assert_eq!(manager.state(), ConnectionState::Connecting);
    assert!(state.borrow().ap_starts.is_empty());

    manager.tick();
    assert_eq!(manager.state(), ConnectionState::NotConnected);
    assert_eq!(state.borrow().ap_starts, ["rescue"]);
}

#[test]
fn alone_only_never_attempts_station_mode() {
    let (mut manager, state) = manager();
    manager.set_ap_mode(ApMode::AloneOnly);
    manager
        .set_access_point(AccessPointProfile::new("standalone", None))
        .unwrap();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();

    manager.tick();
    manager.tick();
    manager.tick();

    let state = state.borrow();
    assert_eq!(state.ap_starts, ["standalone"]);
    assert_eq!(state.scan_requests, 0);
    assert!(state.connect_attempts.is_empty());
    assert_eq!(manager.state(), ConnectionState::NotConnected);
}

#[test]
fn both_mode_runs_the_access_point_alongside_station_attempts() {
    let (mut manager, state) = manager();
    manager.set_ap_mode(ApMode::Both);
    manager
        .set_access_point(AccessPointProfile::new("always-on", None))
        .unwrap();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40)]));

    manager.tick();
    assert_eq!(state.borrow().ap_starts, ["always-on"]);
    assert_eq!(manager.state(), ConnectionState::Scanning);

    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Connecting);
    // Still only one bring-up.
    assert_eq!(state.borrow().ap_starts.len(), 1);
}

#[test]
fn rejected_access_point_reports_failure() {
    let (mut manager, state) = manager();
    manager.set_ap_mode(ApMode::AloneOnly);
    manager
        .set_access_point(AccessPointProfile::new("standalone", None))
        .unwrap();
    state.borrow_mut().accept_ap = false;
    let events = record_events(&mut manager);

    manager.tick();
    assert!(!manager.ap_started());
    assert_eq!(
        messages(&events),
        [Message::AccessPointCreating, Message::AccessPointFailed]
    );

    // The failed bring-up is throttled, not retried every tick.
    manager.tick();
    assert_eq!(state.borrow().ap_starts.len(), 1);
}

#[test]
fn ap_mode_radio_off_powers_down() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    let events = record_events(&mut manager);

    manager.set_ap_mode(ApMode::RadioOff);
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::RadioOff);
    assert_eq!(state.borrow().power_events, [false]);
    assert_eq!(messages(&events), [Message::TurningOff]);

    // Terminal until explicitly turned back on.
    manager.tick();
    manager.tick();
    assert_eq!(messages(&events), [Message::TurningOff]);
}

#[test]
fn turn_off_and_on_round_trip() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();
    let events = record_events(&mut manager);

    manager.turn_off();
    assert_eq!(manager.state(), ConnectionState::RadioOff);
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 0);

    manager.turn_on();
    assert_eq!(manager.state(), ConnectionState::NotConnected);
    manager.tick();
    assert_eq!(manager.state(), ConnectionState::Scanning);
    assert_eq!(state.borrow().power_events, [false, true]);
    assert_eq!(
        messages(&events),
        [Message::TurningOff, Message::TurningOn, Message::Scanning]
    );
}

#[test]
fn forced_disconnect_arms_the_throttle() {
    let (mut manager, state) = manager();
    manager.add_network(NetworkProfile::new("Home", None)).unwrap();

    state
        .borrow_mut()
        .scan_outcomes
        .push_back(ScanOutcome::Ready(vec![obs("Home", -40)]));
    state.borrow_mut().steady_link = LinkStatus::Connected;

    manager.tick();
    manager.tick();
    manager.tick();
    assert!(manager.is_connected());

    manager.disconnect();
    assert_eq!(manager.state(), ConnectionState::NotConnected);
    assert_eq!(state.borrow().disconnects, 1);
    assert_eq!(manager.current_ssid(), None);

    // An explicit disconnect is not auto-reversed on the very next tick.
    manager.tick();
    assert_eq!(state.borrow().scan_requests, 1);
}

#[test]
fn forced_ap_creation_ignores_the_mode() {
    let (mut manager, state) = manager();
    manager.set_ap_mode(ApMode::Off);
    let events = record_events(&mut manager);

    // No profile configured yet.
    assert_eq!(manager.create_ap(), Err(ConfigError::NoAccessPointConfigured));
    assert_eq!(messages(&events), [Message::AccessPointFailed]);

    manager
        .set_access_point(AccessPointProfile::new("manual", None))
        .unwrap();
    manager.create_ap().unwrap();
    assert!(manager.ap_started());
    assert_eq!(state.borrow().ap_starts, ["manual"]);
    assert_eq!(manager.ap_ssid(), Some("manual"));
}

#[test]
fn hostname_validation_keeps_the_previous_name() {
    let (mut manager, state) = manager();
    let events = record_events(&mut manager);

    let too_long = "a-hostname-that-is-too-long";
    let result = manager.set_hostname(too_long);
    assert_eq!(
        result,
        Err(ConfigError::HostnameTooLong {
            len: too_long.len(),
            max: 20
        })
    );
    // Rejected before reaching the driver.
    assert!(state.borrow().hostnames.is_empty());
    assert_eq!(messages(&events), [Message::HostnameError]);

    manager.set_hostname("sensor-7").unwrap();
    assert_eq!(manager.hostname(), Some("sensor-7"));

    state.borrow_mut().accept_hostname = false;
    assert_eq!(
        manager.set_hostname("rejected"),
        Err(ConfigError::HostnameRejected)
    );
    assert_eq!(manager.hostname(), Some("sensor-7"));

    // Hostname failures never disturb the state machine.
    assert_eq!(manager.state(), ConnectionState::NotConnected);
}

#[test]
fn subscribers_run_in_order_and_panics_are_isolated() {
    let (mut manager, _state) = manager();
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&order);
    manager.subscribe(move |_, _| first.borrow_mut().push("first"));
    manager.subscribe(|message, _| panic!("subscriber exploded on {message}"));
    let third = Rc::clone(&order);
    manager.subscribe(move |_, _| third.borrow_mut().push("third"));

    manager.turn_off();
    assert_eq!(*order.borrow(), ["first", "third"]);
}
