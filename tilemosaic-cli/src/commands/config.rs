//! Config command - manage the INI configuration file.

use std::path::Path;

use clap::Subcommand;
use tilemosaic::config::{config_file_path, ConfigFile};

use crate::error::CliError;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,
}

pub fn run(config_path: Option<&Path>, command: ConfigCommands) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Init { force } => init(&path, force),
        ConfigCommands::Show => show(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    println!("# {}", path.display());
    print!("{}", config.to_ini_string());
    Ok(())
}
