use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback positions are reported in 100ns ticks
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// One user's watch state for one media item, as read from a server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedItem {
    pub id: String, // Assumed identical across servers for the same media
    pub name: String,
    pub item_type: String,
    pub played: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played_date: Option<DateTime<Utc>>,
    pub play_count: u32,
    pub position_ticks: i64,
    pub runtime_ticks: i64,
}

impl WatchedItem {
    pub fn has_position(&self) -> bool {
        self.position_ticks > 0
    }

    pub fn position(&self) -> Duration {
        ticks_to_duration(self.position_ticks)
    }
}

/// Convert 100ns ticks to a `Duration`, clamping negative values to zero
pub fn ticks_to_duration(ticks: i64) -> Duration {
    if ticks <= 0 {
        return Duration::ZERO;
    }
    let ticks = ticks as u64;
    let per_second = TICKS_PER_SECOND as u64;
    Duration::new(ticks / per_second, ((ticks % per_second) * 100) as u32)
}
