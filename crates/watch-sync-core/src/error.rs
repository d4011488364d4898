use crate::outcome::{UserSyncOutcome, WatchSyncOutcome};
use thiserror::Error;

/// Reasons a sync phase stops before finishing its batch
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Watch history sync interrupted after {} of {} items", .partial.processed(), .partial.total)]
    Interrupted { partial: WatchSyncOutcome },

    #[error("User sync interrupted after {} of {} users", .partial.processed(), .partial.total)]
    UsersInterrupted { partial: UserSyncOutcome },
}
