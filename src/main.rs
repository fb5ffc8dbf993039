//! apiwatch daemon
//!
//! Run with: cargo run -- -c ./config.json
//!
//! Environment variables:
//! - RUST_LOG: Log filter (default: apiwatch=info)
//!
//! With `--once` every test item is polled a single time without sending
//! notifications, a summary is printed, and the exit status is non-zero if
//! any target failed.

use std::path::PathBuf;
use std::sync::Arc;

use apiwatch::config::{self, DEFAULT_CONFIG_PATH};
use apiwatch::monitor;
use apiwatch::Dispatcher;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "apiwatch", version, about = "HTTP(S) uptime monitor")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Poll every test item once, print a summary and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apiwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::load(&cli.config)?;
    let dispatcher = Dispatcher::from_settings(&settings)?;
    // One-shot checks only log; they never page anyone.
    let dispatcher = Arc::new(if cli.once { Dispatcher::new() } else { dispatcher });
    let runners = monitor::build_runners(&settings, dispatcher)?;

    tracing::info!("apiwatch configuration:");
    tracing::info!("  Config file: {}", cli.config.display());
    tracing::info!("  Test items: {}", runners.len());
    tracing::info!("  Mail alerts: {}", enabled(settings.mail.enable));
    tracing::info!("  SMS alerts: {}", enabled(settings.sms.enable));

    if runners.is_empty() {
        tracing::warn!("No test items configured");
    }

    if cli.once {
        let reports = futures::future::join_all(runners.iter().map(|r| r.tick())).await;

        let mut failing = 0;
        for report in &reports {
            println!(
                "{}: {} healthy, {} failing ({} ms)",
                report.item,
                report.healthy(),
                report.failing(),
                report.elapsed.as_millis()
            );
            for target in &report.targets {
                match target.outcome.reason() {
                    None => println!("  [{}] {} OK", target.name, target.address),
                    Some(reason) => println!("  [{}] {} FAIL: {}", target.name, target.address, reason),
                }
            }
            failing += report.failing();
        }

        if failing > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Runners never finish; this keeps the process alive.
    futures::future::join_all(monitor::start_all(runners)).await;

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}
