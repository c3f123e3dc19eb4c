//! Quarry CLI - Import model files and inspect the result

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{extents, hierarchy, inspect, OutputFormat};
use log::debug;
use quarry_import::ImportConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Import 3D model files and inspect meshes, materials and node hierarchy", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.quarry and .quarry lookup
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a model and print a summary
    Inspect {
        /// Path to the model file (e.g., ship.gltf, crate.obj)
        path: PathBuf,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },

    /// Print the node hierarchy of a model
    Hierarchy {
        /// Path to the model file
        path: PathBuf,
    },

    /// Print the local extents of a model and each of its meshes
    Extents {
        /// Path to the model file
        path: PathBuf,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: OutputFormat,
    },
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn init_logging(config: &ImportConfig) {
    // RUST_LOG still wins over the configured filter
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();
}

/// Where the configuration came from, for the startup log line
fn config_source(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "~/.quarry and .quarry lookup".to_string(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ImportConfig::load_from_file(path)?,
        None => ImportConfig::load()?,
    };
    init_logging(&config);
    debug!(
        "config from {}: log filter '{}', reports {:?}",
        config_source(cli.config.as_deref()),
        config.log_filter,
        config.report
    );

    match cli.command {
        Commands::Inspect { path, format } => inspect::run(&path, format, config),
        Commands::Hierarchy { path } => hierarchy::run(&path, config),
        Commands::Extents { path, format } => extents::run(&path, format, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_source_names_explicit_file_or_lookup() {
        assert_eq!(config_source(Some(Path::new("quarry.toml"))), "quarry.toml");
        assert!(config_source(None).contains(".quarry"));
    }

    #[test]
    fn cli_accepts_global_config() {
        let cli = Cli::parse_from(["quarry", "hierarchy", "ship.obj", "--config", "custom.toml"]);
        assert_eq!(cli.config.as_deref(), Some(Path::new("custom.toml")));
        assert!(matches!(cli.command, Commands::Hierarchy { .. }));
    }
}
