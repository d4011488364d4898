use crate::error::SourceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use watch_sync_models::{ItemUserData, User, WatchedItem};

/// User and item operations of one media server
///
/// Every operation reports failure as a `SourceError` value; callers treat a
/// failed call as unresolvable for the user or item at hand and move on.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Name used in logs ("source", "destination", ...)
    fn server_name(&self) -> &str;

    /// Users in server order
    async fn list_users(&self) -> Result<Vec<User>, SourceError>;

    /// Users including the has-password flag
    async fn list_users_detailed(&self) -> Result<Vec<User>, SourceError> {
        self.list_users().await
    }

    /// Create a user, returning the server-assigned id
    async fn create_user(&self, name: &str, has_password: bool) -> Result<String, SourceError>;

    /// All items the user has played, fully paginated, in server order
    async fn list_watched_items(&self, user_id: &str) -> Result<Vec<WatchedItem>, SourceError>;

    /// Per-user status of one item; `None` when the catalog has no such item
    async fn get_item_user_status(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<ItemUserData>, SourceError>;

    async fn mark_played(
        &self,
        user_id: &str,
        item_id: &str,
        played_date: Option<DateTime<Utc>>,
    ) -> Result<(), SourceError>;

    async fn update_progress(
        &self,
        user_id: &str,
        item_id: &str,
        position_ticks: i64,
        is_paused: bool,
    ) -> Result<(), SourceError>;
}
