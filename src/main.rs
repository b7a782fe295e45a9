//! Pod Minder - an unattended podcast feed archiver.
//!
//! Periodically fetches configured RSS feeds, downloads new episodes into
//! per-year folders, writes a fresh tag set (including cover art) into each
//! audio file, and enforces a per-feed retention cap across the feed's whole
//! archived history.

mod archiver;
mod cli;
mod config;
mod cover;
mod error;
mod feed;
mod model;
mod sanitize;
mod service;
mod shutdown;
mod tagger;
#[cfg(test)]
mod test_utils;

use clap::Parser;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use error::Error;
use shutdown::Shutdown;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("pod_minder=info".parse().unwrap()))
        .init();

    match run(&args).await {
        Ok(()) => {
            tracing::info!("pod-minder stopped");
            Ok(())
        }
        // Cancellation is a clean shutdown, exit code 0
        Err(Error::Cancelled(_)) => {
            tracing::info!("pod-minder stopped");
            Ok(())
        }
        // Anything else that reaches this point is fatal, exit code 1
        Err(e) => Err(e.into()),
    }
}

async fn run(args: &cli::Cli) -> error::Result<()> {
    let config = config::load(&args.config)?;

    match &args.command {
        Some(cli::Commands::CheckConfig) => {
            print_config(&args.config, &config);
            Ok(())
        }
        Some(cli::Commands::Once) => {
            build_service(config).archive_all().await?;
            Ok(())
        }
        None => {
            build_service(config).run().await?;
            Ok(())
        }
    }
}

fn build_service(config: config::Config) -> service::ArchiverService {
    let client = reqwest::Client::new();
    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());
    service::ArchiverService::new(config, client, shutdown)
}

fn print_config(path: &Path, config: &config::Config) {
    println!("Configuration at {} is valid", path.display());
    println!("Output path: {}", config.output_path.display());

    let times: Vec<String> = config
        .run_times()
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect();
    println!("Run times: {}", times.join(", "));

    println!("Feeds ({}):", config.feeds.len());
    for feed in &config.feeds {
        let title = feed.title.as_deref().unwrap_or("(from feed)");
        let count = feed
            .count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "all".to_string());
        println!("  {} ({}) keep {}", feed.url, title, count);
    }
}

/// Cancel the shutdown token on Ctrl-C (and SIGTERM on Unix).
fn spawn_signal_handler(shutdown: Shutdown) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("shutdown signal received");
        shutdown.cancel();
    });
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
