//! Command-line definitions for the `tributes` binary.

use clap::{Args, Parser, Subcommand};

/// tributes - Share and read memorial tributes
///
/// Tributes are stored by a hosted backend and cached locally, so `list`
/// works offline. Run `sync` to refresh the cache.
#[derive(Debug, Parser)]
#[command(name = "tributes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Backend endpoint for this run (overrides config and TRIBUTES_ENDPOINT)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Default log filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch all tributes from the backend into the local cache
    Sync,

    /// Show cached tributes, newest first
    List(ListCommand),

    /// Submit a new tribute
    Submit(SubmitCommand),

    /// Delete a tribute submitted from this device
    Delete {
        /// Identifier of the tribute
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove all locally cached tributes
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show this device's owner token and data directory
    Whoami,

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show the N most recent tributes
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub latest: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    pub fn latest_count(&self) -> Option<usize> {
        self.latest.map(|n| usize::try_from(n).unwrap_or(usize::MAX))
    }
}

#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Your name (defaults to "Anonymous")
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Your relation (defaults to "Friend")
    #[arg(short, long, default_value = "")]
    pub relation: String,

    /// The tribute message (at least 10 characters)
    pub message: String,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Store the backend endpoint
    SetEndpoint {
        /// Backend script URL
        url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "tributes", "submit", "--name", "Ann", "-r", "Sister", "We miss you every day",
        ])
        .unwrap();
        match cli.command {
            Command::Submit(cmd) => {
                assert_eq!(cmd.name, "Ann");
                assert_eq!(cmd.relation, "Sister");
                assert_eq!(cmd.message, "We miss you every day");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_submit_defaults_blank() {
        let cli = Cli::try_parse_from(["tributes", "submit", "We miss you every day"]).unwrap();
        match cli.command {
            Command::Submit(cmd) => {
                assert_eq!(cmd.name, "");
                assert_eq!(cmd.relation, "");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "tributes", "list", "--latest", "4", "--endpoint", "https://example.com/exec", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.endpoint.as_deref(), Some("https://example.com/exec"));
        assert_eq!(cli.log_level(), "debug");
        assert!(matches!(cli.command, Command::List(ListCommand { latest: Some(4), json: false })));
    }

    #[test]
    fn test_latest_must_be_positive() {
        assert!(Cli::try_parse_from(["tributes", "list", "--latest", "0"]).is_err());
        assert!(Cli::try_parse_from(["tributes", "list", "--latest", "-2"]).is_err());

        let cli = Cli::try_parse_from(["tributes", "list", "-l", "1"]).unwrap();
        match cli.command {
            Command::List(cmd) => assert_eq!(cmd.latest_count(), Some(1)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_delete_and_config() {
        let cli = Cli::try_parse_from(["tributes", "delete", "row-7", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Delete { ref id, yes: true } if id == "row-7"));

        let cli =
            Cli::try_parse_from(["tributes", "config", "set-endpoint", "https://x/exec"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::SetEndpoint { .. })));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["tributes", "-q", "-v", "sync"]).is_err());
        let cli = Cli::try_parse_from(["tributes", "-q", "sync"]).unwrap();
        assert_eq!(cli.log_level(), "error");
    }

    #[test]
    fn test_submit_requires_message() {
        assert!(Cli::try_parse_from(["tributes", "submit"]).is_err());
    }
}
