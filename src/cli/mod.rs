//! CLI module for the hadith search tool.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use crate::models::OutputFormat;

/// Semantic search over hadith collections.
#[derive(Debug, Parser)]
#[command(name = "hsearch")]
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
    /// Create the database tables and the vector collection
    Init(commands::InitArgs),

    /// Ingest a collection upload document (JSON)
    Ingest(commands::IngestArgs),

    /// Search ingested hadiths
    Search(commands::SearchArgs),

    /// Check backend status (PostgreSQL, embedder, Qdrant)
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
