use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use watch_sync_models::ServerRole;

/// Items requested per page when listing a user's watched items
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Validated configuration: both servers are fully specified
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: ServerConfig,
    pub destination: ServerConfig,
    pub sync: SyncSettings,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub url: String,
    pub api_key: String,
}

impl ServerConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

// Keep API keys out of logs and error reports
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("url", &self.url)
            .field("api_key", &"********")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// On-disk shape. Every key is optional here so a missing one can be reported
// by name instead of surfacing as a generic parse error.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawConfig {
    #[serde(default)]
    source: Option<RawServer>,
    #[serde(default)]
    destination: Option<RawServer>,
    #[serde(default)]
    sync: Option<SyncSettings>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawServer {
    url: Option<String>,
    api_key: Option<String>,
}

impl Config {
    pub fn new(source: ServerConfig, destination: ServerConfig) -> Self {
        Self {
            source,
            destination,
            sync: SyncSettings::default(),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let source = server_from_raw(raw.source, ServerRole::Source)?;
        let destination = server_from_raw(raw.destination, ServerRole::Destination)?;
        let config = Config {
            source,
            destination,
            sync: raw.sync.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let raw = RawConfig {
            source: Some(RawServer {
                url: Some(self.source.url.clone()),
                api_key: Some(self.source.api_key.clone()),
            }),
            destination: Some(RawServer {
                url: Some(self.destination.url.clone()),
                api_key: Some(self.destination.api_key.clone()),
            }),
            sync: Some(self.sync.clone()),
        };
        Ok(toml::to_string_pretty(&raw)?)
    }

    pub fn server(&self, role: ServerRole) -> &ServerConfig {
        match role {
            ServerRole::Source => &self.source,
            ServerRole::Destination => &self.destination,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in [ServerRole::Source, ServerRole::Destination] {
            let server = self.server(role);
            if !(server.url.starts_with("http://") || server.url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    section: role.to_string(),
                    key: "url",
                    reason: format!("'{}' must start with http:// or https://", server.url),
                });
            }
        }
        if self.sync.page_size == 0 {
            return Err(ConfigError::Invalid {
                section: "sync".to_string(),
                key: "page_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Template written by `watchsync init`
    pub fn template() -> Self {
        Self::new(
            ServerConfig::new("http://old-server:8096", "SOURCE_API_KEY"),
            ServerConfig::new("http://new-server:8096", "DESTINATION_API_KEY"),
        )
    }
}

fn server_from_raw(raw: Option<RawServer>, role: ServerRole) -> Result<ServerConfig, ConfigError> {
    let raw = raw.unwrap_or_default();
    let url = require(raw.url, role, "url")?;
    let api_key = require(raw.api_key, role, "api_key")?;
    Ok(ServerConfig { url, api_key })
}

fn require(value: Option<String>, role: ServerRole, key: &'static str) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingKey {
            section: role.to_string(),
            key,
        }),
    }
}
