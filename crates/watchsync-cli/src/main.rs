use clap::{ArgAction, Parser, Subcommand};
use commands::prompts::{PresetAnswers, UserSyncChoice};
use commands::{init, sync};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "watchsync")]
#[command(about = "Copy users and watch history from one Jellyfin server to another")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync users and watch history from source to destination (default)
    #[command(long_about = "Compare users on both servers, optionally create the missing ones on the destination, then copy watched items for one or all users present on both. Anything not given as a flag is asked interactively.")]
    Sync {
        /// Create users missing on the destination without asking
        #[arg(long, action = ArgAction::SetTrue)]
        create_users: bool,

        /// Skip user creation without asking
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "create_users")]
        skip_user_creation: bool,

        /// Sync only this user (exact name, must exist on both servers)
        #[arg(long, value_name = "NAME", conflicts_with = "all")]
        user: Option<String>,

        /// Sync every user present on both servers
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
    },
    /// Write a configuration template
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

impl Commands {
    fn default_sync() -> Self {
        Commands::Sync {
            create_users: false,
            skip_user_creation: false,
            user: None,
            all: false,
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command.unwrap_or_else(Commands::default_sync) {
        Commands::Sync {
            create_users,
            skip_user_creation,
            user,
            all,
        } => {
            output.banner("Jellyfin Watch History Sync Tool");
            let user_sync = if create_users {
                Some(UserSyncChoice::CreateMissing)
            } else if skip_user_creation {
                Some(UserSyncChoice::Skip)
            } else {
                None
            };
            let answers = PresetAnswers { user_sync, user, all };
            let status = sync::run_sync(cli.config.as_deref(), answers, &output).await?;
            Ok(status.exit_code())
        }
        Commands::Init { force } => {
            init::run_init(cli.config.as_deref(), force, &output)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_sync() {
        let cli = Cli::try_parse_from(["watchsync"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_sync_flags() {
        let cli = Cli::try_parse_from(["watchsync", "sync", "--create-users", "--user", "alice"]).unwrap();
        match cli.command {
            Some(Commands::Sync {
                create_users, user, all, ..
            }) => {
                assert!(create_users);
                assert_eq!(user.as_deref(), Some("alice"));
                assert!(!all);
            }
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn test_conflicting_flags_are_rejected() {
        assert!(Cli::try_parse_from(["watchsync", "sync", "--create-users", "--skip-user-creation"]).is_err());
        assert!(Cli::try_parse_from(["watchsync", "sync", "--user", "alice", "--all"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["watchsync", "init", "--config", "/tmp/w.toml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
    }
}
