use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "weave",
    version,
    about = "Merge per-repository activity logs into one visualizer log"
)]
pub struct Cli {
    /// Config file (defaults to ./weave.toml when present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Console log format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Identity service token, overriding the configured environment variable
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clone or fetch every source and regenerate its activity log
    Update,
    /// Merge the source logs into the output artifact, then collect avatars
    Build {
        /// Only write the merged log
        #[arg(long)]
        skip_avatars: bool,
    },
    /// Collect avatars for the configured roster only
    Avatars,
    /// Update, then build
    All {
        /// Only write the merged log
        #[arg(long)]
        skip_avatars: bool,
    },
}

impl Cli {
    /// Level implied by `-v`, if any
    pub fn level_override(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["weave", "-vv", "build", "--skip-avatars"]).unwrap();
        assert!(matches!(cli.command, Command::Build { skip_avatars: true }));
        assert_eq!(cli.level_override(), Some("trace"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "weave",
            "avatars",
            "--config",
            "site/weave.toml",
            "--log-format",
            "json",
            "--token",
            "abc",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Avatars));
        assert_eq!(cli.config, Some(PathBuf::from("site/weave.toml")));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.token.as_deref(), Some("abc"));
        assert_eq!(cli.level_override(), None);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["weave"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
