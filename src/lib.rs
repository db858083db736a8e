//! # roomlink
//!
//! Connectivity and reporting core for room occupancy controllers. The
//! controller watches a small number of rooms (occupancy, door state, usage
//! counters) and keeps a remote backend and a chat recipient informed over
//! Wi-Fi. This crate is the part that talks to the outside world; sensing and
//! counter persistence live elsewhere. It supports `no_std` environments.
//!
//! ## Components
//!
//! - **[`network::link::LinkManager`]**: keeps the radio associated, with a
//!   cooldown between attempts, a hard radio reset per attempt, a reentrancy
//!   guard, and a bounded wait that keeps the watchdog fed
//! - **[`report::StatusReporter`]**: builds a device snapshot and POSTs it to
//!   the backend, returning whether the backend acknowledged it
//! - **[`notify::Notifier`]**: fire-and-forget push messages over HTTPS
//! - **[`room`]**: the shared room state the reporter reads
//!
//! The platform provides the radio driver ([`network::link::Radio`]), a
//! connector for TCP and TLS streams ([`network::Connect`]), a millisecond
//! clock ([`system::Clock`]), a delay ([`embedded_hal::delay::DelayNs`]) and
//! the watchdog feed ([`system::Liveness`]).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roomlink::config::{DeviceConfig, LinkSettings};
//! use roomlink::network::Connect;
//! use roomlink::network::link::{LinkManager, Radio};
//! use roomlink::notify::Notifier;
//! use roomlink::report::StatusReporter;
//! use roomlink::room::{RoomSource, SharedRooms};
//! use roomlink::system::Clock;
//! use embedded_hal::delay::DelayNs;
//!
//! static ROOMS: SharedRooms = SharedRooms::new();
//!
//! fn run<R, K, D, N>(config: DeviceConfig, radio: R, clock: K, delay: D, backend: N, push: N)
//! where
//!     R: Radio,
//!     K: Clock + Copy,
//!     D: DelayNs,
//!     N: Connect,
//! {
//!     let link = LinkManager::new(radio, clock, delay, config.wifi.clone(), config.link);
//!     let mut reporter = StatusReporter::new(&config, backend, &ROOMS, clock).unwrap();
//!     let mut notifier = Notifier::new(&config.push, push).unwrap();
//!     let mut watchdog = || { /* feed the hardware watchdog */ };
//!
//!     loop {
//!         if reporter.report_status(&link, &mut watchdog).is_ok() {
//!             let state = ROOMS.read();
//!             if state.cleaning_required {
//!                 notifier.notify_heartbeat(&link, &mut watchdog, &state);
//!             }
//!         }
//!     }
//! }
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Startup configuration: identity, endpoints, credentials and link timing.
pub mod config;

/// Failure classes of a report or notification attempt.
pub mod error;

/// Network abstraction layer: transport traits, HTTP client and link supervision.
pub mod network;

/// Push notifications.
pub mod notify;

/// Status reporting to the backend.
pub mod report;

/// Shared room occupancy state.
pub mod room;

/// System collaborators: watchdog liveness and time.
pub mod system;

pub use error::ReportError;
