use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use platefind_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "platefind")]
#[command(about = "Hybrid image + text recipe search", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: .platefind.toml, then user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: json, pretty
    #[arg(short, long, default_value = "pretty", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import documents (JSON array with precomputed embeddings)
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Search the catalog by text and/or image
    Search {
        /// Free-text query
        query: Option<String>,

        /// Image file to search by
        #[arg(long)]
        image: Option<PathBuf>,

        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Image modality weight (default from config, 0 when no image)
        #[arg(long)]
        image_weight: Option<f32>,

        /// Text modality weight (default from config, 0 when no text)
        #[arg(long)]
        text_weight: Option<f32>,
    },

    /// Show catalog status
    Status,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable formatted output
    Pretty,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = if std::env::var("PLATEFIND_DEBUG").is_ok() {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?,
        None => Config::load(),
    };

    match cli.command {
        Commands::Import { file } => {
            commands::import::run(config, &file)?;
        }
        Commands::Search {
            query,
            image,
            limit,
            image_weight,
            text_weight,
        } => {
            commands::search::run(
                config,
                query.as_deref(),
                image.as_deref(),
                limit,
                image_weight,
                text_weight,
                cli.format,
            )?;
        }
        Commands::Status => {
            commands::status::run(config)?;
        }
    }

    Ok(())
}
