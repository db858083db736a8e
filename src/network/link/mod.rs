//! Radio link supervision.
//!
//! [`LinkManager`] keeps the station connected to its access point without
//! ever starving the rest of the firmware:
//!
//! - a connected link is detected with one cheap status query and nothing else
//!   happens;
//! - attempts never nest, a call made while one is running returns at once;
//! - attempt starts are spaced by at least the configured cooldown;
//! - every attempt hard-resets the radio (disconnect, power cycle, station
//!   mode, power saving off) before connecting, because soft retries leave
//!   some radios wedged after intermittent failures;
//! - the wait for association is bounded and feeds the watchdog on every poll.
//!
//! Failure is never reported through a return value. Callers look at
//! [`Link::is_up`] afterwards.
//!
//! ```text
//!            ensure()                 poll ok
//! Disconnected ───────▶ Connecting ───────────▶ Connected
//!      ▲                    │ timeout               │
//!      └────────────────────┴───────────────────────┘
//!                          link lost (seen on next query)
//! ```

use crate::config::{LinkSettings, MAX_SSID_LEN, WifiCredentials};
use crate::system::{Clock, Liveness};
use core::cell::{Cell, RefCell};
use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};
use log::{debug, info, warn};


/// Maximum number of networks kept from a pre-connect scan.
pub const MAX_SCAN_RESULTS: usize = 15;

/// Station status as reported by the radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioStatus {
    Idle,
    NoSsidAvailable,
    ScanCompleted,
    Connected,
    ConnectFailed,
    ConnectionLost,
    Disconnected,
}

impl RadioStatus {
    /// Short name used in log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::NoSsidAvailable => "NO_SSID",
            Self::ScanCompleted => "SCAN_DONE",
            Self::Connected => "CONNECTED",
            Self::ConnectFailed => "CONNECT_FAIL",
            Self::ConnectionLost => "CONN_LOST",
            Self::Disconnected => "DISCONNECTED",
        }
    }
}

/// One network seen by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: String<MAX_SSID_LEN>,
    pub rssi: i8,
    pub secured: bool,
}

pub type ScanResults = Vec<AccessPoint, MAX_SCAN_RESULTS>;

/// The Wi-Fi station driver.
///
/// Implemented by the platform on top of its radio stack. None of the calls
/// may block for long; waiting for association is done by [`LinkManager`].
pub trait Radio {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Current station status. Must be cheap.
    fn status(&self) -> RadioStatus;
    /// Drops any association.
    fn disconnect(&mut self) -> Result<(), Self::Error>;
    /// Turns the radio subsystem off.
    fn power_down(&mut self) -> Result<(), Self::Error>;
    /// Turns the radio subsystem back on.
    fn power_up(&mut self) -> Result<(), Self::Error>;
    /// Selects station (client) mode.
    fn set_station_mode(&mut self) -> Result<(), Self::Error>;
    /// Enables or disables modem power saving.
    fn set_power_save(&mut self, enabled: bool) -> Result<(), Self::Error>;
    /// Lets the driver re-associate on its own after a drop.
    fn set_auto_reconnect(&mut self, enabled: bool) -> Result<(), Self::Error>;
    /// Issues a connect request. Returns without waiting for the result.
    fn begin(&mut self, credentials: &WifiCredentials) -> Result<(), Self::Error>;

    /// Signal strength of the current association.
    fn rssi(&self) -> Option<i8> {
        None
    }

    /// Lists visible networks, strongest first.
    ///
    /// Blocks until the scan completes. The watchdog is fed right before
    /// and right after the call, so a scan must finish inside one
    /// watchdog period.
    fn scan(&mut self, results: &mut ScanResults) -> Result<(), Self::Error> {
        results.clear();
        Ok(())
    }
}

/// Link state as tracked by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// What the reporter and notifier need from a link.
pub trait Link {
    /// Tries to make the link usable. Never fails, may do nothing.
    fn ensure(&self, watchdog: &mut dyn Liveness);
    /// Cheap check whether the link is usable right now.
    fn is_up(&self) -> bool;
}

impl<T: Link + ?Sized> Link for &T {
    fn ensure(&self, watchdog: &mut dyn Liveness) {
        (**self).ensure(watchdog)
    }

    fn is_up(&self) -> bool {
        (**self).is_up()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RetryGovernor {
    last_attempt_ms: Option<u64>,
    in_progress: bool,
}

/// Owns the radio and all link bookkeeping.
///
/// Shared by reference between the status reporter and the notifier; every
/// operation takes `&self`.
#[derive(Debug)]
pub struct LinkManager<R, C, D> {
    radio: RefCell<R>,
    delay: RefCell<D>,
    clock: C,
    credentials: WifiCredentials,
    settings: LinkSettings,
    state: Cell<LinkState>,
    governor: Cell<RetryGovernor>,
    attempts: Cell<u32>,
}

impl<R, C, D> LinkManager<R, C, D>
where
    R: Radio,
    C: Clock,
    D: DelayNs,
{
    pub fn new(
        radio: R,
        clock: C,
        delay: D,
        credentials: WifiCredentials,
        settings: LinkSettings,
    ) -> Self {
        Self {
            radio: RefCell::new(radio),
            delay: RefCell::new(delay),
            clock,
            credentials,
            settings,
            state: Cell::new(LinkState::Disconnected),
            governor: Cell::new(RetryGovernor::default()),
            attempts: Cell::new(0),
        }
    }

    /// Makes sure the link is usable.
    ///
    /// Returns immediately when the link is up, when an attempt is already
    /// running, or when the last attempt started less than the cooldown ago.
    /// Otherwise performs one attempt, bounded by the connect timeout.
    pub fn ensure_link(&self, watchdog: &mut dyn Liveness) {
        if self.is_connected() {
            return;
        }

        let governor = self.governor.get();
        if governor.in_progress {
            debug!("link: attempt already in progress, skipping");
            return;
        }

        let now = self.clock.now_ms();
        if let Some(last) = governor.last_attempt_ms {
            let elapsed = now.saturating_sub(last);
            if elapsed < u64::from(self.settings.cooldown_ms) {
                debug!(
                    "link: cooldown, {} ms of {} ms elapsed",
                    elapsed, self.settings.cooldown_ms
                );
                return;
            }
        }

        self.governor.set(RetryGovernor {
            last_attempt_ms: Some(now),
            in_progress: true,
        });
        self.state.set(LinkState::Connecting);
        self.attempts.set(self.attempts.get().wrapping_add(1));

        let connected = match self.restart_radio(watchdog) {
            Ok(()) => self.wait_for_link(watchdog),
            Err(e) => {
                warn!("link: radio reset failed: {:?}", e);
                false
            }
        };

        if connected {
            if let Err(e) = self.radio.borrow_mut().set_auto_reconnect(true) {
                warn!("link: enabling auto-reconnect failed: {:?}", e);
            }
            self.state.set(LinkState::Connected);
            match self.radio.borrow().rssi() {
                Some(rssi) => info!("link: connected, RSSI={} dBm", rssi),
                None => info!("link: connected"),
            }
        } else {
            self.state.set(LinkState::Disconnected);
            warn!(
                "link: not connected after attempt, status={}",
                self.radio_status().as_str()
            );
        }

        self.governor.set(RetryGovernor {
            last_attempt_ms: Some(now),
            in_progress: false,
        });
    }

    /// Queries the radio and refreshes the tracked state.
    ///
    /// A drop is noticed here: a link that was `Connected` and no longer is
    /// becomes `Disconnected`.
    pub fn is_connected(&self) -> bool {
        let connected = self.radio_status() == RadioStatus::Connected;
        match (connected, self.state.get()) {
            (true, _) => self.state.set(LinkState::Connected),
            (false, LinkState::Connected) => {
                debug!("link: lost");
                self.state.set(LinkState::Disconnected);
            }
            (false, _) => {}
        }
        connected
    }

    /// Last tracked state, without querying the radio.
    pub fn state(&self) -> LinkState {
        self.state.get()
    }

    /// Number of connection attempts started since construction.
    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Gives the peripherals back.
    pub fn release(self) -> (R, C, D) {
        (self.radio.into_inner(), self.clock, self.delay.into_inner())
    }

    fn radio_status(&self) -> RadioStatus {
        match self.radio.try_borrow() {
            Ok(radio) => radio.status(),
            // Only reachable while the radio is being reset.
            Err(_) => RadioStatus::Disconnected,
        }
    }

    fn restart_radio(&self, watchdog: &mut dyn Liveness) -> Result<(), R::Error> {
        let mut radio = self.radio.borrow_mut();
        radio.disconnect()?;
        radio.power_down()?;
        radio.power_up()?;
        watchdog.signal();
        radio.set_station_mode()?;
        radio.set_power_save(false)?;

        if self.settings.scan_before_connect {
            log_scan(&mut *radio);
            watchdog.signal();
        }

        info!("link: connecting to SSID='{}'", self.credentials.ssid);
        radio.begin(&self.credentials)
    }

    fn wait_for_link(&self, watchdog: &mut dyn Liveness) -> bool {
        let interval = self.settings.poll_interval_ms.max(1);
        let timeout = u64::from(self.settings.connect_timeout_ms);
        // A clock that stops must not turn the wait into a hang.
        let max_polls = (self.settings.connect_timeout_ms / interval).saturating_add(1);
        let start = self.clock.now_ms();

        for _ in 0..=max_polls {
            watchdog.signal();
            if self.radio_status() == RadioStatus::Connected {
                return true;
            }
            if self.clock.now_ms().saturating_sub(start) >= timeout {
                return false;
            }
            self.delay.borrow_mut().delay_ms(interval);
        }
        false
    }
}

impl<R, C, D> Link for LinkManager<R, C, D>
where
    R: Radio,
    C: Clock,
    D: DelayNs,
{
    fn ensure(&self, watchdog: &mut dyn Liveness) {
        self.ensure_link(watchdog)
    }

    fn is_up(&self) -> bool {
        self.is_connected()
    }
}

fn log_scan<R: Radio>(radio: &mut R) {
    let mut results = ScanResults::new();
    match radio.scan(&mut results) {
        Ok(()) => {
            debug!("link: scan found {} networks", results.len());
            for (i, ap) in results.iter().enumerate() {
                debug!(
                    "  {:2}) {}  RSSI={}  {}",
                    i + 1,
                    ap.ssid,
                    ap.rssi,
                    if ap.secured { "SECURED" } else { "OPEN" }
                );
            }
        }
        Err(e) => debug!("link: scan failed: {:?}", e),
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RadioStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            LinkState::Disconnected => defmt::write!(f, "Disconnected"),
            LinkState::Connecting => defmt::write!(f, "Connecting"),
            LinkState::Connected => defmt::write!(f, "Connected"),
        }
    }
}
