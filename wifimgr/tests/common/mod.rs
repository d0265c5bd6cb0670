//! Scripted mock radio shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use wifimgr::{Addressing, LinkStatus, Message, ScanOutcome, WifiDriver, WifiManager};

/// Observable state of the mock radio, shared with the test body.
pub struct RadioState {
    /// Outcomes returned by successive `poll_scan` calls; exhausted queue
    /// reports `InProgress`.
    pub scan_outcomes: VecDeque<ScanOutcome>,
    /// Statuses returned by successive `station_link_status` calls;
    /// exhausted queue reports `steady_link`.
    pub link_statuses: VecDeque<LinkStatus>,
    pub steady_link: LinkStatus,
    pub accept_ap: bool,
    pub accept_hostname: bool,

    pub scan_requests: usize,
    pub connect_attempts: Vec<String>,
    pub ap_starts: Vec<String>,
    pub hostnames: Vec<String>,
    pub power_events: Vec<bool>,
    pub disconnects: usize,
}

impl RadioState {
    fn new() -> Self {
        Self {
            scan_outcomes: VecDeque::new(),
            link_statuses: VecDeque::new(),
            steady_link: LinkStatus::Idle,
            accept_ap: true,
            accept_hostname: true,
            scan_requests: 0,
            connect_attempts: Vec::new(),
            ap_starts: Vec::new(),
            hostnames: Vec::new(),
            power_events: Vec::new(),
            disconnects: 0,
        }
    }
}

/// A `WifiDriver` whose every interaction is scripted and recorded.
pub struct MockRadio {
    state: Rc<RefCell<RadioState>>,
}

impl MockRadio {
    /// Returns the driver and a handle for scripting/inspection.
    pub fn new() -> (Self, Rc<RefCell<RadioState>>) {
        let state = Rc::new(RefCell::new(RadioState::new()));
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }
}

impl WifiDriver for MockRadio {
    fn request_scan(&mut self) {
        self.state.borrow_mut().scan_requests += 1;
    }

    fn poll_scan(&mut self) -> ScanOutcome {
        self.state
            .borrow_mut()
            .scan_outcomes
            .pop_front()
            .unwrap_or(ScanOutcome::InProgress)
    }

    fn begin_station_connect(
        &mut self,
        ssid: &str,
        _passphrase: Option<&str>,
        _addressing: &Addressing,
    ) {
        self.state
            .borrow_mut()
            .connect_attempts
            .push(ssid.to_string());
    }

    fn station_link_status(&mut self) -> LinkStatus {
        let mut state = self.state.borrow_mut();
        let steady = state.steady_link;
        state.link_statuses.pop_front().unwrap_or(steady)
    }

    fn station_disconnect(&mut self) {
        let mut state = self.state.borrow_mut();
        state.disconnects += 1;
        state.steady_link = LinkStatus::Idle;
    }

    fn start_access_point(
        &mut self,
        ssid: &str,
        _passphrase: Option<&str>,
        _addressing: &Addressing,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        state.ap_starts.push(ssid.to_string());
        state.accept_ap
    }

    fn set_hostname(&mut self, name: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.hostnames.push(name.to_string());
        state.accept_hostname
    }

    fn power_radio(&mut self, on: bool) {
        self.state.borrow_mut().power_events.push(on);
    }
}

/// Recorded lifecycle events: (message, optional parameter).
pub type EventLog = Rc<RefCell<Vec<(Message, Option<String>)>>>;

/// Subscribes a recording callback and returns the log handle.
pub fn record_events(manager: &mut WifiManager<MockRadio>) -> EventLog {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::clone(&log);
    manager.subscribe(move |message, param| {
        handle
            .borrow_mut()
            .push((message, param.map(str::to_string)));
    });
    log
}

/// The messages recorded so far, without parameters.
pub fn messages(log: &EventLog) -> Vec<Message> {
    log.borrow().iter().map(|(m, _)| *m).collect()
}
