//! Command line and environment configuration.

use clap::{Parser, Subcommand};
use todos_core::{Filter, TodoId, UserId};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(name = "todos", about = "Manage a todo list kept on a remote API", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the todo API
    #[arg(long, env = "TODOS_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// User id every request is scoped to
    #[arg(long, env = "TODOS_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Which todos to show afterwards (all, active, completed)
    #[arg(short, long, default_value = "all", global = true)]
    pub filter: Filter,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the list (default)
    List,
    /// Add a todo
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Flip one todo between active and completed
    Toggle { id: TodoId },
    /// Complete every active todo, or reactivate all if none is active
    ToggleAll,
    /// Delete a todo
    #[command(alias = "rm")]
    Remove { id: TodoId },
    /// Delete every completed todo
    ClearCompleted,
    /// Change a todo's title; a blank title deletes it
    Rename {
        id: TodoId,
        #[arg(num_args = 0..)]
        title: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no user id configured")]
    MissingUserId,
    #[error("invalid user id: {0}")]
    InvalidUserId(String),
}

/// Settings the session is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub user_id: UserId,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let raw = cli
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(ConfigError::MissingUserId)?;
        let user_id = raw
            .parse::<UserId>()
            .map_err(|_| ConfigError::InvalidUserId(raw.to_string()))?;
        // 0 is never a real account.
        if user_id == 0 {
            return Err(ConfigError::MissingUserId);
        }
        Ok(Self {
            api_url: cli.api_url.clone(),
            user_id,
        })
    }
}

pub const SETUP_INSTRUCTIONS: &str = "\
A user id is required before todos can be loaded.

  1. Register on the todo API and note your numeric user id.
  2. Export it:   export TODOS_USER_ID=<your id>
     or pass it:  todos --user-id <your id>
  3. Point at another server with TODOS_API_URL or --api-url if needed.
";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("todos").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn missing_user_id_is_reported() {
        let mut cli = parse(&["list"]);
        cli.user_id = None;
        assert_eq!(Config::from_cli(&cli), Err(ConfigError::MissingUserId));
    }

    #[test]
    fn zero_user_id_counts_as_missing() {
        let cli = parse(&["--user-id", "0"]);
        assert_eq!(Config::from_cli(&cli), Err(ConfigError::MissingUserId));
    }

    #[test]
    fn garbage_user_id_is_invalid() {
        let cli = parse(&["--user-id", "abc"]);
        assert!(matches!(Config::from_cli(&cli), Err(ConfigError::InvalidUserId(_))));
    }

    #[test]
    fn flags_build_config() {
        let cli = parse(&["--user-id", "42", "--api-url", "http://x", "toggle", "3"]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.user_id, 42);
        assert_eq!(config.api_url, "http://x");
        assert_eq!(cli.command, Some(Command::Toggle { id: 3 }));
    }

    #[test]
    fn title_words_and_filter_parse() {
        let cli = parse(&["add", "Buy", "milk", "--filter", "#/active"]);
        assert_eq!(
            cli.command,
            Some(Command::Add {
                title: vec!["Buy".into(), "milk".into()]
            })
        );
        assert_eq!(cli.filter, Filter::Active);
    }
}
