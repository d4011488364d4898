use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;
use watch_sync_core::{ItemOutcome, ProgressSink, UserSyncOutcome, WatchSyncOutcome};
use watch_sync_models::WatchedItem;

/// Progress display for the sync phases
///
/// On a terminal each batch (users to create, one user's items) gets a
/// progress bar and a line per item; otherwise progress goes to structured
/// logging.
pub struct SyncUI {
    bar: Mutex<Option<ProgressBar>>,
    interactive: bool,
}

impl SyncUI {
    pub fn new(enabled: bool) -> Self {
        let interactive = enabled && is_interactive();

        if !interactive {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bars disabled, using structured logging"
            );
        }

        Self {
            bar: Mutex::new(None),
            interactive,
        }
    }

    fn start_bar(&self, len: usize, label: &str) {
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message(label.to_string());
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn line(&self, text: String) {
        if let Ok(slot) = self.bar.lock() {
            match slot.as_ref() {
                Some(pb) => {
                    pb.println(text);
                    pb.inc(1);
                }
                None => println!("{}", text),
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressSink for SyncUI {
    fn users_to_create(&self, total: usize) {
        if self.interactive {
            self.start_bar(total, "Creating users");
        } else {
            tracing::info!(operation = "create_users", total, "Creating users on destination");
        }
    }

    fn user_created(&self, index: usize, name: &str, created: bool, counters: &UserSyncOutcome) {
        if self.interactive {
            let status = if created {
                format!("{} Created user: {}", "✓".green(), name)
            } else {
                format!("{} FAILED to create user: {}", "✗".red(), name)
            };
            self.line(format!(
                "[{}/{}] {} | Created: {} | Remaining: {}",
                index,
                counters.total,
                status,
                counters.created,
                counters.remaining()
            ));
            if counters.remaining() == 0 {
                self.finish_bar();
            }
        } else {
            tracing::info!(
                operation = "progress",
                current = index,
                total = counters.total,
                user = name,
                created,
                "User creation progress"
            );
        }
    }

    fn user_started(&self, index: usize, total_users: usize, name: &str) {
        if self.interactive {
            println!("\n[{}/{}] Processing user: {}", index, total_users, name.bold());
        } else {
            tracing::info!(operation = "user", current = index, total = total_users, user = name, "Processing user");
        }
    }

    fn items_to_sync(&self, name: &str, source_count: usize, to_sync: usize) {
        if self.interactive && to_sync > 0 {
            self.start_bar(to_sync, &format!("{}: {} new of {} watched", name, to_sync, source_count));
        }
    }

    fn item_finished(&self, index: usize, item: &WatchedItem, outcome: ItemOutcome, counters: &WatchSyncOutcome) {
        let name = item.name.as_str();
        if self.interactive {
            let status = match outcome {
                ItemOutcome::Completed if item.has_position() => {
                    format!("{} {} (resume at {})", "✓".green(), name, format_position(item.position()))
                }
                ItemOutcome::Completed => format!("{} {}", "✓".green(), name),
                ItemOutcome::Skipped => format!("{} {} (item not found on destination)", "SKIPPED:".yellow(), name),
                ItemOutcome::Failed => format!("{} {}", "✗ FAILED:".red(), name),
            };
            self.line(format!(
                "[{}/{}] {} | Completed: {} | Remaining: {}",
                index,
                counters.total,
                status,
                counters.completed,
                counters.remaining()
            ));
            if counters.remaining() == 0 {
                self.finish_bar();
            }
        } else {
            tracing::info!(
                operation = "progress",
                current = index,
                total = counters.total,
                item = name,
                position_ticks = item.position_ticks,
                outcome = ?outcome,
                "Item sync progress"
            );
        }
    }

    fn user_finished(&self, name: &str, outcome: &WatchSyncOutcome) {
        self.finish_bar();
        if !self.interactive {
            tracing::info!(
                operation = "user_done",
                user = name,
                total = outcome.total,
                completed = outcome.completed,
                skipped = outcome.skipped,
                failed = outcome.failed,
                "User sync finished"
            );
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Playback position as `H:MM:SS`, or `M:SS` under an hour
pub fn format_position(position: Duration) -> String {
    let secs = position.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
