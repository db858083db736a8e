//! Room occupancy state as seen by the reporting core.
//!
//! The sensing side of the firmware (motion and door inputs, session
//! bookkeeping, counter persistence) owns this state and is the only writer.
//! The core only ever reads it, through [`RoomSource`], and always takes a
//! full copy of all rooms at once so a report never mixes values from before
//! and after an update.

use core::cell::RefCell;
use critical_section::Mutex;

/// Number of rooms a controller supervises.
pub const ROOM_COUNT: usize = 3;

/// Occupancy and usage counters of one room.
///
/// `use_count` and `total_use_ms` only grow between counter resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomState {
    /// A session is currently in progress.
    pub occupied: bool,
    /// Completed sessions since the last reset.
    pub use_count: u32,
    /// Accumulated session time since the last reset.
    pub total_use_ms: u64,
    /// Door contact reports closed.
    pub door_closed: bool,
}

/// Device-wide state the reporter renders into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceState {
    /// Per-room state, index 0 is room 1.
    pub rooms: [RoomState; ROOM_COUNT],
    /// Cleaning is due; overrides every room's displayed state.
    pub cleaning_required: bool,
    /// Time of the last cleaning (counter reset).
    pub last_clean_ts_ms: u64,
    /// Persisted counters have been restored after boot.
    ///
    /// Until this is set the counters read zero and must not be reported.
    pub counters_loaded: bool,
}

/// Consistent read access to the device state.
pub trait RoomSource {
    /// Returns a copy of all rooms and flags taken in one pass.
    fn read(&self) -> DeviceState;
}

/// A caller that already holds a stable copy can report it directly.
impl RoomSource for DeviceState {
    fn read(&self) -> DeviceState {
        *self
    }
}

impl<T: RoomSource + ?Sized> RoomSource for &T {
    fn read(&self) -> DeviceState {
        (**self).read()
    }
}

/// Device state shared between the sensing code and the reporter.
///
/// Both sides go through a short critical section: the sensing side to apply
/// an update, the reporter to copy the whole table out.
///
/// ```rust
/// use roomlink::room::{RoomSource, SharedRooms};
///
/// static ROOMS: SharedRooms = SharedRooms::new();
///
/// ROOMS.update(|state| {
///     state.rooms[1].occupied = true;
///     state.counters_loaded = true;
/// });
/// assert!(ROOMS.read().rooms[1].occupied);
/// ```
#[derive(Debug)]
pub struct SharedRooms {
    inner: Mutex<RefCell<DeviceState>>,
}

impl SharedRooms {
    /// All rooms vacant, zero counters, counters not yet loaded.
    pub const fn new() -> Self {
        Self::with_state(DeviceState {
            rooms: [RoomState {
                occupied: false,
                use_count: 0,
                total_use_ms: 0,
                door_closed: false,
            }; ROOM_COUNT],
            cleaning_required: false,
            last_clean_ts_ms: 0,
            counters_loaded: false,
        })
    }

    /// Starts from a known state.
    pub const fn with_state(state: DeviceState) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(state)),
        }
    }

    /// Applies a mutation from the sensing side.
    pub fn update<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        critical_section::with(|cs| {
            let mut state = self.inner.borrow_ref_mut(cs);
            f(&mut *state)
        })
    }
}

impl Default for SharedRooms {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomSource for SharedRooms {
    fn read(&self) -> DeviceState {
        critical_section::with(|cs| *self.inner.borrow_ref(cs))
    }
}
