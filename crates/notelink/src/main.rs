use anyhow::{Context, Result};
use clap::Parser;
use notelink::cli::{Cli, Commands};
use notelink::{Config, Server};
use notelink_core::Resolution;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("notelink={log_level},notelink_core={log_level}")));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Config::load(cli.config.as_deref(), cli.overrides())?;
    tracing::info!("Vault: {}", settings.vault_dir.display());
    let server = Arc::new(Server::new(&settings));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            // Build eagerly so an unreadable vault shows up in the log at startup.
            if let Err(e) = server.snapshot().await {
                tracing::warn!("Initial index build failed: {}", e);
            }
            server.serve(settings.bind, shutdown_signal()).await?;
        }
        Commands::Index => {
            let snapshot = server.snapshot().await?;
            print_json(snapshot.index())?;
        }
        Commands::Backlinks { filename } => {
            let snapshot = server.snapshot().await?;
            print_json(&snapshot.backlinks(&filename, server.snippet()))?;
        }
        Commands::Resolve { target } => {
            let snapshot = server.snapshot().await?;
            let target = notelink_core::matching::link_key(&target).to_string();
            print_json(&Resolution {
                verdict: snapshot.resolve(&target),
                display: target.clone(),
                target,
            })?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
