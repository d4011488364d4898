pub mod diff;
pub mod error;
pub mod interrupt;
pub mod outcome;
pub mod progress;
pub mod reconcile;

pub use diff::{common_users, items_to_sync, missing_users, CommonUser};
pub use error::SyncError;
pub use interrupt::{Interrupt, ItemGuard};
pub use outcome::{ItemOutcome, UserSyncOutcome, WatchSyncOutcome};
pub use progress::{NoProgress, ProgressSink};
pub use reconcile::Reconciler;
