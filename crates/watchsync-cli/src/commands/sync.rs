use super::prompts::{ChoiceProvider, PresetAnswers, PresetChoices, SyncScope, TerminalChoices, UserSyncChoice};
use super::signals::{spawn_interrupt_listener, SyncPhase, INTERRUPTED_MESSAGE};
use super::sync_ui::SyncUI;
use crate::output::Output;
use color_eyre::eyre::Context;
use color_eyre::Result;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use watch_sync_config::{Config, PathManager};
use watch_sync_core::{Interrupt, Reconciler, SyncError};
use watch_sync_sources::JellyfinClient;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Interrupted,
    NoCommonUsers,
}

impl RunStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            RunStatus::Completed | RunStatus::Interrupted => ExitCode::SUCCESS,
            RunStatus::NoCommonUsers => ExitCode::FAILURE,
        }
    }
}

pub async fn run_sync(config_path: Option<&Path>, answers: PresetAnswers, output: &Output) -> Result<RunStatus> {
    tracing::debug!("Sync command started");

    let path = PathManager::default().resolve_config_file(config_path);
    let config = Config::load_from_file(&path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!(source = %config.source.url, destination = %config.destination.url, "Configuration loaded");

    output.info("\nConnecting to servers...");
    let source = JellyfinClient::new("source", &config.source)
        .wrap_err("Failed to create source client")?
        .with_page_size(config.sync.page_size);
    let destination = JellyfinClient::new("destination", &config.destination)
        .wrap_err("Failed to create destination client")?
        .with_page_size(config.sync.page_size);

    let interrupt = Interrupt::new();
    let phase = SyncPhase::new();
    spawn_interrupt_listener(interrupt.clone(), phase.clone(), *output);

    let ui = Arc::new(SyncUI::new(output.is_human() && !output.is_quiet()));
    let reconciler = Reconciler::new(Arc::new(source), Arc::new(destination))
        .with_interrupt(interrupt)
        .with_progress(ui);

    let mut choices = PresetChoices::new(answers, TerminalChoices::new(*output));
    drive(&reconciler, &mut choices, &phase, output).await
}

/// Run sequence: optional user creation, then watch history for one or all users
pub async fn drive(
    reconciler: &Reconciler,
    choices: &mut dyn ChoiceProvider,
    phase: &SyncPhase,
    output: &Output,
) -> Result<RunStatus> {
    output.info("Checking existing users on both servers...");
    let missing = reconciler.missing_users().await;

    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|u| u.name.as_str()).collect();
        output.user_list(
            &format!(
                "Found {} user(s) on source that don't exist on destination:",
                missing.len()
            ),
            &names,
        );

        match choices.choose_user_sync(&missing)? {
            UserSyncChoice::CreateMissing => {
                output.banner("Syncing Users from Source to Destination");
                let result = {
                    let _phase = phase.enter();
                    reconciler.sync_users().await
                };
                match result {
                    Ok(outcome) => {
                        output.user_summary(&outcome);
                        if outcome.failed > 0 {
                            output.warn("Some users failed to create. Watch history sync may be incomplete.");
                        }
                        // A stop requested during the last creation takes effect here
                        if reconciler.interrupt().is_triggered() {
                            output.warn(INTERRUPTED_MESSAGE);
                            return Ok(RunStatus::Interrupted);
                        }
                    }
                    Err(SyncError::UsersInterrupted { partial }) => {
                        output.user_summary(&partial);
                        output.warn(INTERRUPTED_MESSAGE);
                        return Ok(RunStatus::Interrupted);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            UserSyncChoice::Skip => output.info("Skipping user sync..."),
        }
    }

    // Lists are fetched again so freshly created users are matched
    let common = reconciler.get_common_users().await;
    if common.is_empty() {
        output.error("No common users found between source and destination servers.");
        output.error("Cannot sync watch history without common users.");
        return Ok(RunStatus::NoCommonUsers);
    }
    output.common_users(&common);

    let (scope_label, result) = match choices.choose_scope(&common)? {
        SyncScope::One => {
            let idx = choices.choose_user(&common)?;
            let user = common
                .get(idx)
                .ok_or_else(|| color_eyre::eyre::eyre!("User number {} is out of range", idx + 1))?;
            output.banner(&format!("Syncing watch history for user: {}", user.name));
            let _phase = phase.enter();
            (user.name.clone(), reconciler.sync_user_watch_history(user).await)
        }
        SyncScope::All => {
            let _phase = phase.enter();
            ("all users".to_string(), reconciler.sync_all_users(&common).await)
        }
    };

    match result {
        Ok(outcome) => {
            output.watch_summary(&scope_label, &outcome);
            Ok(RunStatus::Completed)
        }
        Err(SyncError::Interrupted { partial }) => {
            output.watch_summary(&scope_label, &partial);
            output.warn(INTERRUPTED_MESSAGE);
            Ok(RunStatus::Interrupted)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests;
