//! Augment CLI - Batch image augmentation for training-data diversification.
//!
//! Augment applies geometric, photometric, noise, and color-space transforms
//! to a set of images and packages the results into a zip archive, one folder
//! per operator.
//!
//! # Usage
//!
//! ```bash
//! # Flip and rotate every image in a directory
//! augment run ./photos --ops hflip,rotate
//!
//! # Every operator, reproducible, with a tighter rotation range
//! augment run a.jpg b.png --all --seed 7 --set rotate.angleRange.high=10
//!
//! # Show the catalog and its defaults
//! augment list
//!
//! # View configuration
//! augment config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Augment - Batch image augmentation for training-data diversification.
#[derive(Parser, Debug)]
#[command(name = "augment")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply operators to images and write a zip archive of the results
    Run(cli::run::RunArgs),

    /// List the operator catalog with default parameters
    List(cli::list::ListArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match augment_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `augment config path`."
            );
            augment_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Augment v{}", augment_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::List(args) => cli::list::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "augment", "run", "a.png", "dir", "--ops", "hflip,rotate", "--seed", "3",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.ops, vec!["hflip", "rotate"]);
        assert_eq!(args.seed, Some(3));
    }

    #[test]
    fn test_run_requires_ops_or_all() {
        assert!(Cli::try_parse_from(["augment", "run", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["augment", "run", "a.png", "--all"]).is_ok());
    }
}
