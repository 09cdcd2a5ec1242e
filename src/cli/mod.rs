//! CLI module for the catalog loader.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Load product catalogs into Qdrant and publish product images to S3.
#[derive(Debug, Parser)]
#[command(name = "catalog-loader")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        help = "Output format: text, json, or markdown"
    )]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upsert a parquet product catalog into a Qdrant collection
    Load(commands::LoadArgs),

    /// Upload product images from a zip archive or directory to S3
    UploadImages(commands::UploadArgs),

    /// Check infrastructure status (Qdrant, embedding server)
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
