pub mod config;
pub mod error;
pub mod paths;

pub use config::{Config, ServerConfig, SyncSettings, DEFAULT_PAGE_SIZE};
pub use error::ConfigError;
pub use paths::PathManager;
