use crate::outcome::{ItemOutcome, UserSyncOutcome, WatchSyncOutcome};
use watch_sync_models::WatchedItem;

/// Receives per-step progress from the reconciler
///
/// All methods default to doing nothing.
pub trait ProgressSink: Send + Sync {
    fn users_to_create(&self, _total: usize) {}

    fn user_created(&self, _index: usize, _name: &str, _created: bool, _counters: &UserSyncOutcome) {}

    fn user_started(&self, _index: usize, _total_users: usize, _name: &str) {}

    fn items_to_sync(&self, _name: &str, _source_count: usize, _to_sync: usize) {}

    fn item_finished(&self, _index: usize, _item: &WatchedItem, _outcome: ItemOutcome, _counters: &WatchSyncOutcome) {}

    fn user_finished(&self, _name: &str, _outcome: &WatchSyncOutcome) {}
}

pub struct NoProgress;

impl ProgressSink for NoProgress {}
