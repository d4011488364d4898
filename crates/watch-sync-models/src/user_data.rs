use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user state of one catalog item on a server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemUserData {
    pub played: bool,
    pub play_count: u32,
    pub position_ticks: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played_date: Option<DateTime<Utc>>,
}
