use std::path::{Path, PathBuf};

const APP_DIR: &str = "watchsync";
const CONFIG_FILE: &str = "config.toml";

pub struct PathManager {
    config_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Option<Self> {
        let config_dir = dirs::config_dir()?.join(APP_DIR);
        Some(Self { config_dir })
    }

    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Resolve which config file to use
    ///
    /// An explicit path always wins. Otherwise the platform config file is used
    /// when it exists, falling back to `config.toml` in the working directory.
    pub fn resolve_config_file(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        let platform = self.config_file();
        if platform.exists() {
            return platform;
        }
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            local
        } else {
            platform
        }
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // No platform config dir (e.g. minimal containers): use the working directory
        Self::new().unwrap_or_else(|| Self::with_config_dir("."))
    }
}
