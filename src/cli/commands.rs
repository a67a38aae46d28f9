//! CLI commands implementation.

mod catalog;
mod dataset;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};
use crate::dataset::DetailKind;

#[derive(Parser)]
#[command(name = "census")]
#[command(about = "Census Bureau data catalog client")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON); discovered automatically if omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog datasets, newest first
    Catalog {
        /// Limit number of rows shown (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Emit every column as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show the projected metadata table stamped with the time of check
    Metadata {
        /// Limit number of rows shown (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Emit rows as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Count labels of a list-valued catalog field (e.g. keyword, bureauCode)
    Labels {
        /// Catalog field holding a list per dataset
        key: String,
        /// Limit number of labels shown (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// Print a dataset's base access URL
    Url {
        /// Dataset identifier (e.g. https://api.census.gov/data/id/DECENNIALPL2020)
        identifier: String,
    },

    /// Show a dataset's variables
    Variables {
        identifier: String,
        /// Limit number of rows shown (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Emit rows as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show the geography levels a dataset supports
    Geography {
        identifier: String,
        /// Emit rows as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show a dataset's variable groups
    Groups {
        identifier: String,
        /// Emit rows as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print the raw JSON of one detail endpoint
    Detail {
        identifier: String,
        #[arg(value_enum)]
        kind: DetailKind,
    },

    /// Fetch every detail endpoint of a dataset and report what answered
    Inspect { identifier: String },
}

/// Parse arguments, resolve settings and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config.clone(),
        timeout_override: cli.timeout,
    };
    let settings = load_settings(&options).await?;

    match cli.command {
        Commands::Catalog { limit, json } => catalog::cmd_catalog(&settings, limit, json).await,
        Commands::Metadata { limit, json } => catalog::cmd_metadata(&settings, limit, json).await,
        Commands::Labels { key, limit } => catalog::cmd_labels(&settings, &key, limit).await,
        Commands::Url { identifier } => catalog::cmd_url(&settings, &identifier).await,
        Commands::Variables {
            identifier,
            limit,
            json,
        } => dataset::cmd_variables(&settings, &identifier, limit, json).await,
        Commands::Geography { identifier, json } => {
            dataset::cmd_geography(&settings, &identifier, json).await
        }
        Commands::Groups { identifier, json } => {
            dataset::cmd_groups(&settings, &identifier, json).await
        }
        Commands::Detail { identifier, kind } => {
            dataset::cmd_detail(&settings, &identifier, kind).await
        }
        Commands::Inspect { identifier } => dataset::cmd_inspect(&settings, &identifier).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_detail_kind() {
        let cli = Cli::try_parse_from([
            "census",
            "detail",
            "https://api.census.gov/data/id/DECENNIALPL2020",
            "geography",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Detail {
                kind: DetailKind::Geography,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["census", "labels", "keyword", "--timeout", "20", "-v"])
            .unwrap();
        assert_eq!(cli.timeout, Some(20));
        assert!(cli.verbose);
    }
}
