//! Canned notification texts.

use super::MAX_MESSAGE_LEN;
use crate::room::ROOM_COUNT;
use core::fmt::Write;
use heapless::String;

pub type Message = String<MAX_MESSAGE_LEN>;

/// `room_index` is 0-based; the text names the room 1-based.
pub fn cleaning_required(room_index: usize, use_count: u32) -> Message {
    let mut text = Message::new();
    // Bounded templates never exceed MAX_MESSAGE_LEN.
    let _ = write!(
        text,
        "🚨 Room {} needs cleaning ({} uses)",
        room_index.saturating_add(1),
        use_count
    );
    text
}

pub fn counters_reset() -> Message {
    let mut text = Message::new();
    let _ = text.push_str("✅ Counters have been reset. All rooms marked clean.");
    text
}

pub fn heartbeat(cleaning_required: bool, use_counts: [u32; ROOM_COUNT]) -> Message {
    let mut text = Message::new();
    let _ = write!(
        text,
        "💡 Heartbeat\nCleaningRequired={}",
        if cleaning_required { "YES" } else { "NO" }
    );
    for (i, count) in use_counts.iter().enumerate() {
        let _ = write!(text, "\nR{} uses={}", i + 1, count);
    }
    text
}
