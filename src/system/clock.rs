//! Monotonic time source.

/// Milliseconds since an arbitrary fixed origin (boot, usually).
///
/// Must never go backwards; the link cooldown and the bounded connect wait
/// are computed from differences of successive readings.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
