//! Donation tracker entry point.
//!
//! Loads configuration, initialises structured logging, asks for the
//! fundraiser id if the config doesn't name one, then polls until Ctrl+C
//! or the first error.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use donation_tracker::config::AppConfig;
use donation_tracker::engine::scheduler::Scheduler;
use donation_tracker::engine::{EngineConfig, PollEngine};
use donation_tracker::source::justgiving::JustGivingClient;
use donation_tracker::storage::FileSink;
use donation_tracker::types::Slot;

const BANNER: &str = "Just Giving Donation Tracker v4.2\n\
Dedicated to Cancer Research UK and you, because your donation will make a difference.\n";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let cfg = AppConfig::load_or_default("config.toml")?;

    println!("{BANNER}");
    for slot in Slot::ALL {
        info!(%slot, path = %cfg.output.path_for(*slot).display(), "Writing slot to file");
    }

    let stream_id = match cfg.tracker.stream_id.clone() {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => prompt_stream_id().await?,
    };

    let app_id = AppConfig::resolve_env(&cfg.api.app_id_env).unwrap_or_else(|e| {
        warn!(error = %e, "No JustGiving application id configured, using an empty id");
        String::new()
    });

    let source = Arc::new(JustGivingClient::new(&cfg.api.base_url, SecretString::new(app_id))?);
    let sink = Arc::new(FileSink::new(cfg.output.clone()));
    let mut engine = PollEngine::new(
        EngineConfig::from_app_config(stream_id.clone(), &cfg),
        source,
        sink,
    );
    let scheduler = Scheduler::from_secs(cfg.tracker.poll_interval_secs);

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    match scheduler.run(&mut engine, shutdown).await {
        Ok(cycles) => {
            info!(cycles, "Donation tracker stopped.");
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message(&stream_id));
            std::process::exit(1);
        }
    }
}

/// Ask for the fundraiser id on stdin.
async fn prompt_stream_id() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"\nPlease enter fundraiser ID.\n").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read fundraiser ID")?;

    let id = line.trim();
    if id.is_empty() {
        anyhow::bail!("No fundraiser ID given");
    }
    Ok(id.to_string())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("donation_tracker=info"));

    let json_logging = std::env::var("TRACKER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
