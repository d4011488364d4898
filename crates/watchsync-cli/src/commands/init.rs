use crate::output::Output;
use color_eyre::eyre::{bail, Context};
use color_eyre::Result;
use std::path::{Path, PathBuf};
use watch_sync_config::{Config, PathManager};

/// Write a starter configuration file and return where it went
pub fn run_init(config_path: Option<&Path>, force: bool, output: &Output) -> Result<PathBuf> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => PathManager::default().config_file(),
    };
    write_template(&path, force)?;

    output.success(format!("Configuration template written to {}", path.display()));
    output.info("Fill in the server URLs and API keys, then run 'watchsync sync'.");
    Ok(path)
}

fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    tracing::debug!(path = %path.display(), "Writing configuration template");
    Config::template()
        .save_to_file(path)
        .wrap_err_with(|| format!("Failed to write configuration to {}", path.display()))
}
