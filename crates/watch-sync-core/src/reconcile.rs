use crate::diff::{self, CommonUser};
use crate::error::SyncError;
use crate::interrupt::Interrupt;
use crate::outcome::{ItemOutcome, UserSyncOutcome, WatchSyncOutcome};
use crate::progress::{NoProgress, ProgressSink};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use watch_sync_models::{User, WatchedItem};
use watch_sync_sources::CatalogClient;

/// Copies watch history from a source server to a destination server
///
/// Every remote call is awaited before the next one is issued. Remote
/// failures never abort a phase: a failed listing counts as empty, a failed
/// status lookup skips the item, a failed write fails only that item.
pub struct Reconciler {
    source: Arc<dyn CatalogClient>,
    destination: Arc<dyn CatalogClient>,
    interrupt: Interrupt,
    progress: Arc<dyn ProgressSink>,
}

impl Reconciler {
    pub fn new(source: Arc<dyn CatalogClient>, destination: Arc<dyn CatalogClient>) -> Self {
        Self {
            source,
            destination,
            interrupt: Interrupt::new(),
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Stop flag shared with the caller
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub async fn source_users(&self) -> Vec<User> {
        list_users_or_empty(self.source.as_ref(), false).await
    }

    pub async fn destination_users(&self) -> Vec<User> {
        list_users_or_empty(self.destination.as_ref(), false).await
    }

    /// Source users that do not exist on the destination
    pub async fn missing_users(&self) -> Vec<User> {
        let source = self.source_users().await;
        let destination = self.destination_users().await;
        diff::missing_users(&source, &destination)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Users present on both servers, matched by name, in source order
    pub async fn get_common_users(&self) -> Vec<CommonUser> {
        let source = self.source_users().await;
        let destination = self.destination_users().await;
        let common = diff::common_users(&source, &destination);
        debug!(
            source_users = source.len(),
            destination_users = destination.len(),
            common = common.len(),
            "Matched users by name"
        );
        common
    }

    /// Create every source user missing from the destination
    ///
    /// Users are always created without a password; destination credentials
    /// are never migrated.
    #[instrument(skip(self))]
    pub async fn sync_users(&self) -> Result<UserSyncOutcome, SyncError> {
        debug!("Fetching users from source server");
        let source = list_users_or_empty(self.source.as_ref(), true).await;
        debug!("Fetching users from destination server");
        let destination = list_users_or_empty(self.destination.as_ref(), false).await;

        let to_create = diff::missing_users(&source, &destination);
        if to_create.is_empty() {
            debug!("All users from source already exist on destination");
            return Ok(UserSyncOutcome::default());
        }

        debug!("Found {} user(s) to create", to_create.len());
        self.progress.users_to_create(to_create.len());

        let mut outcome = UserSyncOutcome::pending(to_create.len());
        for (idx, user) in to_create.iter().enumerate() {
            if self.interrupt.is_triggered() {
                return Err(SyncError::UsersInterrupted { partial: outcome });
            }

            if user.has_password {
                debug!(user = %user.name, "Source user has a password; creating without one");
            }
            let created = match self.destination.create_user(&user.name, false).await {
                Ok(id) => {
                    debug!(user = %user.name, id = %id, "Created user");
                    true
                }
                Err(e) => {
                    warn!(user = %user.name, error = %e, "Failed to create user");
                    false
                }
            };

            outcome = outcome.record(created);
            self.progress.user_created(idx + 1, &user.name, created, &outcome);
        }

        Ok(outcome)
    }

    /// Copy one user's played items to the destination
    #[instrument(skip(self, user), fields(user = %user.name))]
    pub async fn sync_user_watch_history(&self, user: &CommonUser) -> Result<WatchSyncOutcome, SyncError> {
        if self.interrupt.is_triggered() {
            return Err(SyncError::Interrupted {
                partial: WatchSyncOutcome::empty(),
            });
        }

        debug!("Fetching watched items from source server");
        let source_items = watched_items_or_empty(self.source.as_ref(), &user.source_id).await;

        if source_items.is_empty() {
            debug!("No watched items found on source server");
            self.progress.items_to_sync(&user.name, 0, 0);
            return Ok(WatchSyncOutcome::empty());
        }
        debug!("Found {} watched items on source server", source_items.len());

        debug!("Fetching existing watched items from destination server");
        let destination_items =
            watched_items_or_empty(self.destination.as_ref(), &user.destination_id).await;

        let pending = diff::items_to_sync(&source_items, &destination_items);
        self.progress.items_to_sync(&user.name, source_items.len(), pending.len());
        if pending.is_empty() {
            debug!("All items already synced");
            return Ok(WatchSyncOutcome::already_synced(source_items.len()));
        }

        debug!("Syncing {} new items", pending.len());
        let mut outcome = WatchSyncOutcome::pending(pending.len());
        for (idx, item) in pending.iter().enumerate() {
            if self.interrupt.is_triggered() {
                info!(processed = outcome.processed(), total = outcome.total, "Stopping at interrupt request");
                return Err(SyncError::Interrupted { partial: outcome });
            }

            let item_outcome = self.sync_item(&user.destination_id, item).await;
            outcome = outcome.record(item_outcome);
            self.progress.item_finished(idx + 1, item, item_outcome, &outcome);
        }

        Ok(outcome)
    }

    /// Sync every given user in order and sum their counters
    #[instrument(skip(self, users), fields(users = users.len()))]
    pub async fn sync_all_users(&self, users: &[CommonUser]) -> Result<WatchSyncOutcome, SyncError> {
        info!("Syncing watch history for {} users", users.len());
        let mut overall = WatchSyncOutcome::empty();

        for (idx, user) in users.iter().enumerate() {
            if self.interrupt.is_triggered() {
                return Err(SyncError::Interrupted { partial: overall });
            }

            self.progress.user_started(idx + 1, users.len(), &user.name);
            match self.sync_user_watch_history(user).await {
                Ok(outcome) => {
                    self.progress.user_finished(&user.name, &outcome);
                    overall = overall + outcome;
                }
                Err(SyncError::Interrupted { partial }) => {
                    return Err(SyncError::Interrupted {
                        partial: overall + partial,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        Ok(overall)
    }

    async fn sync_item(&self, destination_user_id: &str, item: &WatchedItem) -> ItemOutcome {
        let _in_flight = self.interrupt.begin_item();
        let status = match self
            .destination
            .get_item_user_status(destination_user_id, &item.id)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                debug!(item = %item.name, id = %item.id, error = %e, "Item status lookup failed");
                None
            }
        };
        if status.is_none() {
            debug!(item = %item.name, id = %item.id, "SKIPPED: item not found on destination");
            return ItemOutcome::Skipped;
        }

        if let Err(e) = self
            .destination
            .mark_played(destination_user_id, &item.id, item.played_date)
            .await
        {
            warn!(item = %item.name, id = %item.id, error = %e, "FAILED to mark item as played");
            return ItemOutcome::Failed;
        }

        // Best effort: the played mark stands even if the position update fails
        if item.has_position() {
            if let Err(e) = self
                .destination
                .update_progress(destination_user_id, &item.id, item.position_ticks, true)
                .await
            {
                warn!(item = %item.name, id = %item.id, error = %e, "Failed to update playback progress");
            }
        }

        debug!(item = %item.name, id = %item.id, "Synced");
        ItemOutcome::Completed
    }
}

async fn watched_items_or_empty(client: &dyn CatalogClient, user_id: &str) -> Vec<WatchedItem> {
    match client.list_watched_items(user_id).await {
        Ok(items) => items,
        Err(e) => {
            warn!(server = client.server_name(), user_id, error = %e, "Error fetching watched items");
            Vec::new()
        }
    }
}

async fn list_users_or_empty(client: &dyn CatalogClient, detailed: bool) -> Vec<User> {
    let result = if detailed {
        client.list_users_detailed().await
    } else {
        client.list_users().await
    };
    match result {
        Ok(users) => users,
        Err(e) => {
            warn!(server = client.server_name(), error = %e, "Error fetching users");
            Vec::new()
        }
    }
}
