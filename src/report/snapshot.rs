//! Point-in-time device snapshot sent to the backend.

use crate::error::ReportError;
use crate::room::{DeviceState, ROOM_COUNT};
use serde::Serialize;

/// Displayed state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomLabel {
    Occupied,
    Vacant,
    Cleaning,
}

impl RoomLabel {
    /// Cleaning dominates occupancy.
    pub const fn derive(occupied: bool, cleaning_required: bool) -> Self {
        if cleaning_required {
            RoomLabel::Cleaning
        } else if occupied {
            RoomLabel::Occupied
        } else {
            RoomLabel::Vacant
        }
    }
}

/// One room as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomReport {
    /// 1-based, equal to the room's position in the array plus one.
    pub room_id: u8,
    pub state: RoomLabel,
    pub use_count: u32,
    pub total_use_ms: u64,
    pub door_closed: bool,
}

/// Immutable snapshot of the device, built fresh for every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReportSnapshot<'a> {
    device_id: &'a str,
    last_clean_ts_ms: u64,
    cleaning_required: bool,
    rooms: [RoomReport; ROOM_COUNT],
    ts_ms: u64,
}

impl<'a> DeviceReportSnapshot<'a> {
    /// Renders `state` as captured at `captured_at_ms`.
    pub fn build(device_id: &'a str, state: &DeviceState, captured_at_ms: u64) -> Self {
        let rooms = core::array::from_fn(|i| {
            let room = &state.rooms[i];
            RoomReport {
                room_id: (i + 1) as u8,
                state: RoomLabel::derive(room.occupied, state.cleaning_required),
                use_count: room.use_count,
                total_use_ms: room.total_use_ms,
                door_closed: room.door_closed,
            }
        });

        Self {
            device_id,
            last_clean_ts_ms: state.last_clean_ts_ms,
            cleaning_required: state.cleaning_required,
            rooms,
            ts_ms: captured_at_ms,
        }
    }

    /// Writes the JSON document into `buf` and returns its length.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, ReportError> {
        serde_json_core::to_slice(self, buf).map_err(|_| ReportError::EncodeFailure)
    }

    pub fn device_id(&self) -> &str {
        self.device_id
    }

    pub fn last_clean_ts_ms(&self) -> u64 {
        self.last_clean_ts_ms
    }

    pub fn cleaning_required(&self) -> bool {
        self.cleaning_required
    }

    pub fn rooms(&self) -> &[RoomReport; ROOM_COUNT] {
        &self.rooms
    }

    pub fn ts_ms(&self) -> u64 {
        self.ts_ms
    }
}
