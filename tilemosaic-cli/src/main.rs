//! TileMosaic CLI - download web-map tiles and stitch them into a mosaic.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::run::RunArgs;
use commands::stitch::StitchArgs;

#[derive(Parser)]
#[command(name = "tilemosaic")]
#[command(about = "Download map tiles for a bounding box and stitch them into one raster", long_about = None)]
#[command(version = tilemosaic::VERSION)]
struct Cli {
    /// Use this config file instead of ~/.tilemosaic/config.ini
    #[arg(long = "config", value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every tile covering a bounding box
    Fetch(FetchArgs),

    /// Stitch downloaded tiles into a single raster
    Stitch(StitchArgs),

    /// Fetch, then stitch
    Run(RunArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config_file.as_deref();

    let result = match cli.command {
        Commands::Fetch(args) => commands::fetch::run(config, cli.verbose, args),
        Commands::Stitch(args) => commands::stitch::run(config, cli.verbose, args),
        Commands::Run(args) => commands::run::run(config, cli.verbose, args),
        Commands::Config { command } => commands::config::run(config, command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "tilemosaic",
            "fetch",
            "--lat-start",
            "-33.85",
            "--lat-stop",
            "-33.95",
            "--lon-start",
            "151.1",
            "--lon-stop",
            "151.3",
            "--zoom",
            "14",
            "--provider",
            "yandex",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.area.lat_start, -33.85);
                assert_eq!(args.area.zoom, 14);
                assert_eq!(args.provider.provider.as_deref(), Some("yandex"));
                assert!(args.provider.mode.is_none());
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_stitch_requires_output() {
        assert!(Cli::try_parse_from(["tilemosaic", "stitch", "--zoom", "12"]).is_err());

        let cli = Cli::try_parse_from([
            "tilemosaic",
            "--verbose",
            "stitch",
            "--zoom",
            "12",
            "--output",
            "out.png",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Stitch(_)));
    }

    #[test]
    fn test_parse_config_subcommands() {
        let cli = Cli::try_parse_from(["tilemosaic", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Init { force: true }
            }
        ));

        let cli = Cli::try_parse_from(["tilemosaic", "--config", "x.ini", "config", "show"])
            .unwrap();
        assert_eq!(cli.config_file, Some(PathBuf::from("x.ini")));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
