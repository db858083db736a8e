//! System utilities for embedded devices.
//!
//! This module provides the system-level collaborators the reporting core
//! depends on but does not own: the supervising watchdog and the monotonic
//! millisecond clock. Both are small traits so firmware can hand in the
//! hardware peripheral and tests can hand in a simulation.
//!
//! # Available Utilities
//!
//! - **[`liveness`]**: the "I am still alive" signal owed to the watchdog
//! - **[`clock`]**: monotonic time in milliseconds
//!
//! # Usage
//!
//! ```rust
//! use roomlink::system::{Clock, Liveness};
//!
//! struct Uptime(u64);
//! impl Clock for Uptime {
//!     fn now_ms(&self) -> u64 { self.0 }
//! }
//!
//! let mut feeds = 0;
//! let mut watchdog = || feeds += 1;
//! watchdog.signal();
//! assert_eq!(Uptime(42).now_ms(), 42);
//! ```

/// Watchdog liveness signalling.
pub mod liveness;

/// Monotonic time source.
pub mod clock;

pub use clock::Clock;
pub use liveness::Liveness;
