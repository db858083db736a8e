//! Watchdog liveness signalling.
//!
//! Every blocking wait in the core (the link poll loop and each outbound HTTP
//! exchange) signals liveness at least once per poll interval and again right
//! after it returns, so a watchdog period longer than the poll interval is
//! never exceeded.

/// The "I am still alive" call owed to a supervising watchdog timer.
pub trait Liveness {
    /// Feeds the watchdog.
    fn signal(&mut self);
}

impl<F: FnMut()> Liveness for F {
    fn signal(&mut self) {
        self()
    }
}

/// A liveness sink for platforms without a watchdog.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWatchdog;

impl Liveness for NoWatchdog {
    fn signal(&mut self) {}
}
