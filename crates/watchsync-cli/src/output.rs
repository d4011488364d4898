use clap::ValueEnum;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use watch_sync_core::{CommonUser, UserSyncOutcome, WatchSyncOutcome};

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// Console output for the run: banners, notices and summaries
///
/// Everything goes to stdout except errors; logs are on stderr.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "✓".green(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "success", "message": msg.as_ref() }));
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors should always be shown, even in quiet mode
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", "✗".red(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{}", msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "⚠".yellow(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "warning", "message": msg.as_ref() }));
            }
        }
    }

    /// Section header between ruler lines (human format only)
    pub fn banner(&self, title: &str) {
        if self.quiet || !self.is_human() {
            return;
        }
        let rule = "=".repeat(RULE_WIDTH);
        println!("\n{}\n{}\n{}", rule, title.bold(), rule);
    }

    /// Bulleted list of user names under a heading
    pub fn user_list(&self, heading: &str, names: &[&str]) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("\n{}", heading);
                for name in names {
                    println!("  - {}", name);
                }
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "users", "message": heading, "users": names }));
            }
        }
    }

    /// Numbered table of common users; numbers match the user prompt
    pub fn common_users(&self, users: &[CommonUser]) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!(
                    "\nFound {} common user(s) for watch history sync:",
                    users.len()
                );
                let mut table = Table::new();
                table.load_preset(UTF8_BORDERS_ONLY);
                table.set_header(vec!["#", "User", "Source ID", "Destination ID"]);
                for (idx, user) in users.iter().enumerate() {
                    table.add_row(vec![
                        (idx + 1).to_string(),
                        user.name.clone(),
                        user.source_id.clone(),
                        user.destination_id.clone(),
                    ]);
                }
                println!("{}", table);
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "common_users", "users": users }));
            }
        }
    }

    pub fn user_summary(&self, outcome: &UserSyncOutcome) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                self.banner("USER SYNC SUMMARY");
                println!("Total users to create: {}", outcome.total);
                println!("Successfully created: {}", outcome.created);
                println!("Failed: {}", outcome.failed);
                println!("{}\n", "=".repeat(RULE_WIDTH));
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "summary", "phase": "users", "result": outcome }));
            }
        }
    }

    /// Watch-history counters; `scope` names what was synced ("alice", "all users")
    pub fn watch_summary(&self, scope: &str, outcome: &WatchSyncOutcome) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                self.banner(&format!("SYNC SUMMARY ({})", scope));
                println!("Total items processed: {}", outcome.total);
                println!("Successfully synced: {}", outcome.completed.green());
                println!("Skipped (not found): {}", outcome.skipped);
                if outcome.failed > 0 {
                    println!("Failed: {}", outcome.failed.red());
                } else {
                    println!("Failed: {}", outcome.failed);
                }
                println!("{}\n", "=".repeat(RULE_WIDTH));
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "summary",
                    "phase": "watch_history",
                    "scope": scope,
                    "result": outcome,
                }));
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => {
                println!("{}", data);
            }
        }
    }
}
