use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docsearch")]
#[command(version, about = "Fuzzy search for Markdown and MDX documentation", long_about = None)]
pub struct Cli {
    /// Config file (defaults to $DOCSEARCH_CONFIG, then ./docsearch.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the search index artifact from the docs directory
    Build {
        /// Documentation version; the artifact is written as searchIndex.<version>.json
        #[arg(long = "doc-version")]
        doc_version: Option<String>,
        /// Ignore and overwrite the fingerprint cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Query the index and print ranked results
    Search {
        query: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Read this artifact instead of the configured output
        #[arg(long)]
        index: Option<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the index as an MCP server over stdio (default)
    Serve,
}
