use anyhow::Context;
use clap::Parser;
use docsearch::cli::{Cli, Commands};
use docsearch::config::Config;
use docsearch::index::{BuildStatus, FingerprintCache, IndexArtifact};
use docsearch::search::{SearchOptions, search};
use docsearch::server::DocSearchServer;
use docsearch::tools::format_results;
use docsearch::worker::{SearchState, build_index};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries MCP frames and search output
    docsearch::tracing::init();

    let cli = Cli::parse();
    let (config, config_path) = Config::discover(cli.config.as_deref())?;
    if let Some(path) = &config_path {
        tracing::info!("Using configuration from {}", path.display());
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Build {
            doc_version,
            no_cache,
        } => run_build(&config, doc_version.as_deref(), no_cache),
        Commands::Search {
            query,
            limit,
            threshold,
            index,
            json,
        } => run_search(&config, &query, limit, threshold, index, json),
        Commands::Serve => run_serve(config).await,
    }
}

fn run_build(config: &Config, doc_version: Option<&str>, no_cache: bool) -> anyhow::Result<()> {
    let cache_path = config.cache_path();
    let mut cache = if no_cache {
        FingerprintCache::new()
    } else {
        FingerprintCache::load_or_default(&cache_path)
    };

    let outcome = build_index(config, &mut cache);
    if outcome.report.status() == BuildStatus::AllFailed {
        anyhow::bail!(
            "Every document under {} failed to load; nothing was written",
            config.docs_dir.display()
        );
    }

    let output = config.output_for_version(doc_version);
    outcome.artifact.write(&output)?;
    if let Err(e) = cache.save(&cache_path) {
        tracing::warn!("Failed to persist fingerprint cache: {}", e);
    }

    eprintln!("{}", outcome.report);
    Ok(())
}

fn run_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    threshold: Option<f64>,
    index: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let path = index.unwrap_or_else(|| config.output.clone());
    let artifact = if path.is_file() {
        IndexArtifact::read(&path)?
    } else {
        tracing::info!("No index at {}, building in memory", path.display());
        let mut cache = FingerprintCache::load_or_default(&config.cache_path());
        build_index(config, &mut cache).artifact
    };

    let options = SearchOptions {
        threshold: threshold.unwrap_or(config.search.threshold),
        max_results: limit.unwrap_or(config.search.max_results),
        ..config.search
    };
    let results = search(&artifact.entries, &artifact.weights, query, &options)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("Failed to serialize results")?
        );
    } else if results.is_empty() {
        println!("No results found for '{}'.", query.trim());
    } else {
        println!("{}", format_results(&results));
    }
    Ok(())
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting docsearch MCP server");

    let state = Arc::new(SearchState::new(config));
    if let Err(e) = state.load_artifact() {
        tracing::warn!("{:#}", e);
    }

    // Serve the prebuilt artifact (if any) while a fresh build runs
    let background = Arc::clone(&state);
    tokio::spawn(async move {
        match background.rebuild().await {
            Ok(report) => tracing::info!("Startup build: {}", report),
            Err(e) => tracing::error!("Startup build failed: {:#}", e),
        }
    });

    let server = DocSearchServer::new(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    Ok(())
}
