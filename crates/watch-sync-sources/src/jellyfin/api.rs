use crate::error::SourceError;
use crate::pagination::{Page, PageRequest};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use watch_sync_models::{ItemUserData, User, WatchedItem};

const TOKEN_HEADER: &str = "x-emby-token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub has_password: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<ItemDto>,
    #[serde(default)]
    pub total_record_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemDto {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub item_type: Option<String>,
    pub run_time_ticks: Option<i64>,
    pub user_data: Option<UserDataDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserDataDto {
    #[serde(default)]
    pub played: bool,
    pub play_count: Option<u32>,
    pub playback_position_ticks: Option<i64>,
    pub last_played_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateUserRequest<'a> {
    name: &'a str,
    has_password: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateUserResponse {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProgressRequest {
    position_ticks: i64,
    is_paused: bool,
}

impl UserDto {
    pub fn into_user(self) -> User {
        User::new(self.id, self.name).with_password(self.has_password)
    }
}

impl UserDataDto {
    pub fn into_user_data(self) -> ItemUserData {
        ItemUserData {
            played: self.played,
            play_count: self.play_count.unwrap_or(0),
            position_ticks: self.playback_position_ticks.unwrap_or(0),
            last_played_date: self.last_played_date.as_deref().and_then(parse_timestamp),
        }
    }
}

impl ItemDto {
    /// Convert to a watched item; `None` unless the user data marks it played
    pub fn into_watched_item(self) -> Option<WatchedItem> {
        let user_data = self.user_data?;
        if !user_data.played {
            return None;
        }
        Some(WatchedItem {
            id: self.id,
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            item_type: self.item_type.unwrap_or_else(|| "Unknown".to_string()),
            played: true,
            played_date: user_data.last_played_date.as_deref().and_then(parse_timestamp),
            play_count: user_data.play_count.unwrap_or(0),
            position_ticks: user_data.playback_position_ticks.unwrap_or(0),
            runtime_ticks: self.run_time_ticks.unwrap_or(0),
        })
    }
}

/// Parse a server timestamp
///
/// Jellyfin emits RFC 3339 with seven fractional digits; some versions drop the
/// offset, in which case the value is taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(_) => {
            warn!(value, "Unrecognized timestamp format, ignoring");
            None
        }
    }
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Thin HTTP layer over the Jellyfin REST API
///
/// Base URL and token are fixed at construction; the token travels as a
/// default header so no request can be sent without it or with another
/// server's token.
pub struct JellyfinHttpClient {
    client: Client,
    base_url: String,
}

impl JellyfinHttpClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, SourceError> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                let mut token = reqwest::header::HeaderValue::from_str(api_key)
                    .map_err(|_| SourceError::Config("API key contains invalid characters".to_string()))?;
                token.set_sensitive(true);
                headers.insert(reqwest::header::HeaderName::from_static(TOKEN_HEADER), token);
                headers
            })
            .build()
            .map_err(|e| SourceError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, SourceError> {
        trace!(url, "Sending request");
        request.send().await.map_err(|source| SourceError::Transport {
            url: url.to_string(),
            source,
        })
    }

    fn check(response: Response, url: &str) -> Result<Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(SourceError::status(url, status.as_u16()))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, SourceError> {
        response.json::<T>().await.map_err(|source| SourceError::Decode {
            url: url.to_string(),
            source,
        })
    }

    pub async fn get_users(&self) -> Result<Vec<UserDto>, SourceError> {
        let url = self.url("/Users");
        let response = self.send(self.client.get(&url), &url).await?;
        let response = Self::check(response, &url)?;
        let users: Vec<UserDto> = Self::decode(response, &url).await?;
        debug!("Jellyfin get_users: {} users", users.len());
        Ok(users)
    }

    pub async fn create_user(&self, name: &str, has_password: bool) -> Result<String, SourceError> {
        let url = self.url("/Users/New");
        let body = CreateUserRequest { name, has_password };
        let response = self.send(self.client.post(&url).json(&body), &url).await?;
        let response = Self::check(response, &url)?;
        let created: CreateUserResponse = Self::decode(response, &url).await?;
        created.id.ok_or(SourceError::MissingField { url, field: "Id" })
    }

    pub async fn get_played_items_page(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> Result<Page<WatchedItem>, SourceError> {
        let url = self.url(&format!("/Users/{}/Items", user_id));
        let query = [
            ("Filters", "IsPlayed".to_string()),
            ("Recursive", "true".to_string()),
            ("Fields", "UserData,MediaSources".to_string()),
            ("Limit", request.limit.to_string()),
            ("StartIndex", request.start_index.to_string()),
        ];
        let response = self.send(self.client.get(&url).query(&query), &url).await?;
        let response = Self::check(response, &url)?;
        let body: ItemsResponse = Self::decode(response, &url).await?;

        let returned = body.items.len();
        // The IsPlayed filter is server-side; re-check each item's own user data
        let items: Vec<WatchedItem> = body
            .items
            .into_iter()
            .filter_map(ItemDto::into_watched_item)
            .collect();
        if items.len() < returned {
            debug!(
                "Jellyfin played items: dropped {} of {} records not marked played",
                returned - items.len(),
                returned
            );
        }

        Ok(Page {
            items,
            returned,
            total_record_count: body.total_record_count,
        })
    }

    pub async fn get_item_user_data(
        &self,
        user_id: &str,
        item_id: &str,
    ) -> Result<Option<ItemUserData>, SourceError> {
        let url = self.url(&format!("/Users/{}/Items/{}", user_id, item_id));
        let response = self
            .send(self.client.get(&url).query(&[("Fields", "UserData")]), &url)
            .await?;
        let response = match Self::check(response, &url) {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let item: ItemDto = Self::decode(response, &url).await?;
        Ok(item.user_data.map(UserDataDto::into_user_data))
    }

    pub async fn mark_played(
        &self,
        user_id: &str,
        item_id: &str,
        played_date: Option<&DateTime<Utc>>,
    ) -> Result<(), SourceError> {
        let url = self.url(&format!("/Users/{}/PlayedItems/{}", user_id, item_id));
        let mut request = self.client.post(&url);
        if let Some(date) = played_date {
            request = request.query(&[("DatePlayed", format_timestamp(date))]);
        }
        let response = self.send(request, &url).await?;
        Self::check(response, &url)?;
        Ok(())
    }

    pub async fn update_progress(
        &self,
        user_id: &str,
        item_id: &str,
        position_ticks: i64,
        is_paused: bool,
    ) -> Result<(), SourceError> {
        let url = self.url(&format!("/Users/{}/PlayingItems/{}/Progress", user_id, item_id));
        let body = ProgressRequest {
            position_ticks,
            is_paused,
        };
        let response = self.send(self.client.post(&url).json(&body), &url).await?;
        Self::check(response, &url)?;
        Ok(())
    }
}
