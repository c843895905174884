//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::download::DownloadArgs;
use crate::cli::commands::probe::ProbeArgs;

#[derive(Parser, Debug)]
#[command(name = "requester")]
#[command(about = "Download every match of a game patch from the open API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to use instead of ./requester.yaml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download all games of the starting game's patch
    Download(DownloadArgs),

    /// Fetch a single game once and report what came back
    Probe(ProbeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FailurePolicy;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_download() {
        let cli = Cli::parse_from([
            "requester",
            "download",
            "--start",
            "13594270",
            "--overwrite",
            "--on-failure",
            "stop-direction",
            "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Download(args) => {
                assert_eq!(args.start, Some(13_594_270));
                assert!(args.overwrite);
                assert_eq!(args.on_failure, Some(FailurePolicy::StopDirection));
                assert_eq!(args.profile, None);
            }
            Commands::Probe(_) => panic!("expected download"),
        }
    }

    #[test]
    fn test_parse_probe_with_config() {
        let cli = Cli::parse_from(["requester", "--config", "alt.yaml", "probe", "42"]);
        assert_eq!(cli.config, Some(PathBuf::from("alt.yaml")));
        assert!(matches!(cli.command, Commands::Probe(ProbeArgs { game_id: 42 })));
    }
}
