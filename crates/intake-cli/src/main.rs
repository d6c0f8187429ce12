//! CLI entry point for Intake.
//!
//! This binary provides the `intake` command with subcommands for running
//! the HTTP service, classifying a single request, and inspecting the
//! effective catalog.

mod cli;
mod config;
mod helpers;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use intake_embed::EmbeddingClient;
use intake_intent::{Catalog, IntentResolver};
use intake_web::WebServer;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::helpers::{init_tracing, load_dotenv};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing("info");
    load_dotenv();

    match cli.command {
        Commands::Serve { bind, port, config } => cmd_serve(&config, bind, port).await,
        Commands::Classify { text, config } => cmd_classify(&config, &text).await,
        Commands::Catalog { config } => cmd_catalog(&config),
    }
}

// ---------------------------------------------------------------------------
// Subcommand: serve
// ---------------------------------------------------------------------------

async fn cmd_serve(config_path: &Path, bind: Option<String>, port: Option<u16>) -> Result<()> {
    let config = AppConfig::load_with_env(config_path)?;

    let mut web = config.web_config();
    if let Some(bind) = bind {
        web.bind_addr = bind;
    }
    if let Some(port) = port {
        web.port = port;
    }

    let catalog = config.catalog()?;
    let client = EmbeddingClient::new(config.embedding_client_config())
        .context("failed to create embedding client")?;

    info!(
        base_url = %config.embedding.base_url,
        model = %config.embedding.model,
        actions = catalog.action_phrases().len(),
        processes = catalog.processes().len(),
        "intake configured"
    );

    WebServer::new(web, IntentResolver::new(catalog), Arc::new(client))
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("web server failed: {e}"))
}

// ---------------------------------------------------------------------------
// Subcommand: classify
// ---------------------------------------------------------------------------

async fn cmd_classify(config_path: &Path, text: &str) -> Result<()> {
    let config = AppConfig::load_with_env(config_path)?;
    let resolver = IntentResolver::new(config.catalog()?);
    let client = EmbeddingClient::new(config.embedding_client_config())
        .context("failed to create embedding client")?;

    resolver
        .warm(&client)
        .await
        .context("failed to warm up the embedding model")?;

    let resolution = resolver
        .resolve_with(text, &client)
        .await
        .context("failed to classify request")?;

    tracing::debug!(
        action_source = resolution.action.source(),
        process_source = resolution.process.source(),
        "classification sources"
    );

    let json = serde_json::to_string_pretty(&resolution.classification)?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: catalog
// ---------------------------------------------------------------------------

fn cmd_catalog(config_path: &Path) -> Result<()> {
    let config = AppConfig::load_with_env(config_path)?;
    let catalog = config.catalog()?;
    print!("{}", render_catalog(&catalog));
    Ok(())
}

/// Human-readable listing of the taxonomy and registry, in match order.
fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::from("Actions:\n");
    for (action, phrases) in catalog.categories() {
        out.push_str(&format!("  {:<10}{}\n", action.as_str(), phrases.join(", ")));
    }
    out.push_str("\nProcesses:\n");
    for label in catalog.processes() {
        out.push_str(&format!("  {label}\n"));
    }
    out
}
