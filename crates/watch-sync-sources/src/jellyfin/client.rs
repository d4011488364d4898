use crate::error::SourceError;
use crate::jellyfin::api::{JellyfinHttpClient, UserDto};
use crate::pagination::collect_pages;
use crate::traits::CatalogClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use watch_sync_config::{ServerConfig, DEFAULT_PAGE_SIZE};
use watch_sync_models::{ItemUserData, User, WatchedItem};

/// `CatalogClient` for one Jellyfin server
pub struct JellyfinClient {
    name: String,
    api: JellyfinHttpClient,
    page_size: u32,
}

impl JellyfinClient {
    pub fn new(name: impl Into<String>, server: &ServerConfig) -> Result<Self, SourceError> {
        Ok(Self {
            name: name.into(),
            api: JellyfinHttpClient::new(&server.url, &server.api_key)?,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

#[async_trait]
impl CatalogClient for JellyfinClient {
    fn server_name(&self) -> &str {
        &self.name
    }

    async fn list_users(&self) -> Result<Vec<User>, SourceError> {
        let users: Vec<User> = self
            .api
            .get_users()
            .await?
            .into_iter()
            .map(UserDto::into_user)
            .collect();
        debug!(server = %self.name, count = users.len(), "Listed users");
        Ok(users)
    }

    async fn create_user(&self, name: &str, has_password: bool) -> Result<String, SourceError> {
        let id = self.api.create_user(name, has_password).await?;
        info!(server = %self.name, user = name, id = %id, "Created user");
        Ok(id)
    }

    async fn list_watched_items(&self, user_id: &str) -> Result<Vec<WatchedItem>, SourceError> {
        let items = collect_pages(self.page_size, |request| {
            debug!(
                server = %self.name,
                user_id,
                start_index = request.start_index,
                limit = request.limit,
                "Fetching played items page"
            );
            self.api.get_played_items_page(user_id, request)
        })
        .await?;
        debug!(server = %self.name, user_id, count = items.len(), "Listed watched items");
        Ok(items)
    }

    async fn get_item_user_status(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<ItemUserData>, SourceError> {
        self.api.get_item_user_data(user_id, item_id).await
    }

    async fn mark_played(
        &self,
        user_id: &str,
        item_id: &str,
        played_date: Option<DateTime<Utc>>,
    ) -> Result<(), SourceError> {
        self.api.mark_played(user_id, item_id, played_date.as_ref()).await
    }

    async fn update_progress(
        &self,
        user_id: &str,
        item_id: &str,
        position_ticks: i64,
        is_paused: bool,
    ) -> Result<(), SourceError> {
        self.api
            .update_progress(user_id, item_id, position_ticks, is_paused)
            .await
    }
}
