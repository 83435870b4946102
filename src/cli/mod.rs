//! CLI module for emoji-judge
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the judge server
//! - `status` - Query a running server's `/health`
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! emoji-judge serve
//!
//! # Check whether the judge has recently produced a pass
//! emoji-judge status --url http://127.0.0.1:8080
//!
//! # Generate shell completions
//! emoji-judge completions bash > ~/.bash_completion.d/emoji-judge
//! ```

pub mod completions;
pub mod config;
pub mod serve;
pub mod status;

pub use completions::handle_completions;
pub use config::handle_config_init;
pub use status::handle_status;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// emoji-judge - vision-model judge for the match-the-emoji game
#[derive(Parser, Debug)]
#[command(
    name = "emoji-judge",
    version,
    about = "Judges webcam snapshots against emoji with a remote vision model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the judge server
    Serve(ServeArgs),
    /// Show a running server's health and judge readiness
    Status(StatusArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "emoji-judge.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "EMOJI_JUDGE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "EMOJI_JUDGE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EMOJI_JUDGE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Base URL of the running server
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "emoji-judge.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["emoji-judge", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("emoji-judge.toml"));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["emoji-judge", "serve", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_config() {
        let cli = Cli::try_parse_from(["emoji-judge", "serve", "-c", "custom.toml"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.config, PathBuf::from("custom.toml")),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::try_parse_from(["emoji-judge", "status", "--json", "-u", "http://h:1"])
            .unwrap();
        match cli.command {
            Commands::Status(args) => {
                assert!(args.json);
                assert_eq!(args.url, "http://h:1");
                assert_eq!(args.timeout, 5);
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["emoji-judge", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => {
                assert!(args.force);
                assert_eq!(args.output, PathBuf::from("emoji-judge.toml"));
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_cli_parse_completions() {
        let cli = Cli::try_parse_from(["emoji-judge", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions(_)));
    }
}
