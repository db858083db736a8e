//! Periodic status reporting to the backend.
//!
//! One call to [`StatusReporter::report_status`] runs the whole cycle in a
//! fixed order: make sure the link is up, check the data is ready, build and
//! encode a fresh snapshot, send it, and classify the answer. Every step that
//! fails ends the cycle with a [`ReportError`]; nothing is retried inside a
//! call.
//!
//! # Example
//!
//! ```rust,no_run
//! use roomlink::network::Connect;
//! use roomlink::network::link::Link;
//! use roomlink::report::StatusReporter;
//! use roomlink::room::SharedRooms;
//! use roomlink::system::Clock;
//!
//! fn tick<N: Connect, L: Link, K: Clock>(
//!     reporter: &mut StatusReporter<N, &SharedRooms, K>,
//!     link: &L,
//! ) {
//!     let outcome = reporter.report_status(link, &mut || feed_watchdog());
//!     if !outcome.is_ok() {
//!         // next tick retries
//!     }
//! }
//! # fn feed_watchdog() {}
//! ```

#![allow(missing_docs)]

pub mod ack;
pub mod snapshot;

pub use snapshot::{DeviceReportSnapshot, RoomLabel, RoomReport};

use crate::config::{ConfigError, DeviceConfig, MAX_DEVICE_ID_LEN};
use crate::error::ReportError;
use crate::network::application::http::{Client, Response};
use crate::network::link::Link;
use crate::network::{Connect, Endpoint};
use crate::room::RoomSource;
use crate::system::{Clock, Liveness};
use heapless::String;
use log::{debug, info, warn};

/// Capacity of an encoded snapshot.
pub const MAX_REPORT_LEN: usize = 1024;

/// Result of one reporting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The backend answered `200` and acknowledged the snapshot.
    Accepted,
    Failed(ReportError),
}

impl ReportOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ReportOutcome::Accepted)
    }

    pub fn error(&self) -> Option<ReportError> {
        match self {
            ReportOutcome::Accepted => None,
            ReportOutcome::Failed(err) => Some(*err),
        }
    }
}

impl From<Result<(), ReportError>> for ReportOutcome {
    fn from(result: Result<(), ReportError>) -> Self {
        match result {
            Ok(()) => ReportOutcome::Accepted,
            Err(err) => ReportOutcome::Failed(err),
        }
    }
}

/// Sends device snapshots to the backend.
#[derive(Debug)]
pub struct StatusReporter<N, S, K> {
    connector: N,
    rooms: S,
    clock: K,
    device_id: String<MAX_DEVICE_ID_LEN>,
    endpoint: Endpoint,
    backend_ok: bool,
}

impl<N, S, K> StatusReporter<N, S, K>
where
    N: Connect,
    S: RoomSource,
    K: Clock,
{
    pub fn new(config: &DeviceConfig, connector: N, rooms: S, clock: K) -> Result<Self, ConfigError> {
        Ok(Self {
            connector,
            rooms,
            clock,
            device_id: config.device_id.clone(),
            endpoint: config.backend_endpoint()?,
            backend_ok: false,
        })
    }

    /// Runs one reporting cycle.
    ///
    /// `watchdog` is signalled right after the link check returns and right
    /// after the POST returns, whatever its result.
    pub fn report_status<L, W>(&mut self, link: &L, watchdog: &mut W) -> ReportOutcome
    where
        L: Link + ?Sized,
        W: Liveness,
    {
        self.backend_ok = false;
        let outcome = ReportOutcome::from(self.run_cycle(link, watchdog));
        self.backend_ok = outcome.is_ok();

        if let ReportOutcome::Failed(err) = outcome {
            warn!("report: not delivered: {:?}", err);
        }
        outcome
    }

    /// Whether the most recent cycle was accepted.
    pub fn backend_ok(&self) -> bool {
        self.backend_ok
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn rooms(&self) -> &S {
        &self.rooms
    }

    fn run_cycle<L, W>(&mut self, link: &L, watchdog: &mut W) -> Result<(), ReportError>
    where
        L: Link + ?Sized,
        W: Liveness,
    {
        link.ensure(&mut *watchdog);
        watchdog.signal();
        if !link.is_up() {
            return Err(ReportError::LinkUnavailable);
        }

        let state = self.rooms.read();
        if !state.counters_loaded {
            debug!("report: counters not restored yet");
            return Err(ReportError::DataNotReady);
        }

        let snapshot = DeviceReportSnapshot::build(&self.device_id, &state, self.clock.now_ms());
        let mut payload = [0u8; MAX_REPORT_LEN];
        let len = snapshot.encode(&mut payload)?;
        let payload = &payload[..len];
        debug!(
            "report: payload {}",
            core::str::from_utf8(payload).unwrap_or("<non-utf8>")
        );

        let response = self.post(payload);
        watchdog.signal();
        let response = response?;

        info!(
            "report: POST {} -> {}",
            self.endpoint.path, response.status_code
        );
        debug!(
            "report: response {}",
            response.body_str().unwrap_or("<non-utf8>")
        );
        if response.truncated {
            warn!("report: response truncated to {} bytes", response.body.len());
        }

        if ack::is_accepted(response.status_code, &response.body) {
            Ok(())
        } else {
            Err(ReportError::BackendRejected {
                status: response.status_code,
            })
        }
    }

    fn post(&mut self, payload: &[u8]) -> Result<Response, ReportError> {
        let connection = self.connector.connect(&self.endpoint)?;
        let mut client = Client::new(connection);
        let response = client.post_json(&self.endpoint, &[], payload);
        if let Err(e) = client.close() {
            debug!("report: close failed: {:?}", e);
        }
        Ok(response?)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReportOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ReportOutcome::Accepted => defmt::write!(f, "Accepted"),
            ReportOutcome::Failed(err) => defmt::write!(f, "Failed({})", err),
        }
    }
}
