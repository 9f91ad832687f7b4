//! wardend - the appwarden background service
//!
//! This is the main entry point for the wardend service.
//! It wires together all the components:
//! - Document store (load, startup purge)
//! - Process host
//! - Monitor engine
//! - Scheduler
//! - The event notifier that stands in for the presentation layer

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use warden_core::{CoreEvent, MonitorEngine};
use warden_host::SystemHost;
use warden_store::{JsonStore, Store};
use warden_util::DATA_FILENAME;

mod scheduler;
use scheduler::Scheduler;

/// Retention window for usage records, purged at startup
const USAGE_RETENTION_DAYS: i64 = 7;

/// wardend - Per-application daily usage budget enforcement
#[derive(Parser, Debug)]
#[command(name = "wardend")]
#[command(about = "Per-application daily usage budget enforcement", long_about = None)]
struct Args {
    /// Data directory override (or set WARDEN_DATA_DIR env var)
    #[arg(short, long, env = "WARDEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    engine: Arc<MonitorEngine>,
    scheduler: Scheduler,
    events: mpsc::UnboundedReceiver<CoreEvent>,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(warden_util::default_data_dir);

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let store: Arc<dyn Store> = Arc::new(JsonStore::new(data_dir.join(DATA_FILENAME)));
        if !store.is_healthy() {
            warn!("Store reports unhealthy, running on in-memory state");
        }

        let mut data = store.load();
        let today = warden_util::now().date_naive();
        let purged = data.purge_usage_older_than(today, USAGE_RETENTION_DAYS);
        if purged > 0 {
            info!(purged, "Purged expired usage records");
        }

        info!(
            data_dir = %data_dir.display(),
            rule_count = data.rules.len(),
            polling_interval_secs = data.settings.polling_interval_seconds,
            "Document loaded"
        );

        let host = Arc::new(SystemHost::new());
        let engine = Arc::new(MonitorEngine::new(data, store.clone(), host));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(engine.clone(), store, event_tx);

        Ok(Self {
            engine,
            scheduler,
            events: event_rx,
        })
    }

    async fn run(mut self) -> Result<()> {
        let interval = self.engine.polling_interval()?;
        self.scheduler.start(interval);

        // Set up signal handlers
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                Some(event) = self.events.recv() => {
                    Self::notify(event);
                }
            }
        }

        // Graceful shutdown
        info!("Shutting down wardend");
        self.scheduler.stop().await;

        // Usage accrued since the last flush would otherwise be lost.
        if let Err(e) = self.engine.save_now() {
            warn!(error = %e, "Final save skipped");
        }

        info!("Shutdown complete");
        Ok(())
    }

    /// Stand-in presentation gateway: surfaces core events as log output.
    fn notify(event: CoreEvent) {
        match event {
            CoreEvent::WarningTriggered {
                display_name,
                remaining_minutes,
                ..
            } => {
                warn!(
                    app = %display_name,
                    remaining_minutes,
                    "Daily budget almost used up"
                );
            }

            CoreEvent::AppKilled {
                display_name,
                process_name,
                ..
            } => {
                info!(
                    app = %display_name,
                    process = %process_name,
                    "Daily budget exhausted, process terminated"
                );
            }

            CoreEvent::AppKillFailed {
                display_name,
                process_name,
                error,
                ..
            } => {
                warn!(
                    app = %display_name,
                    process = %process_name,
                    error = %error,
                    "Could not terminate process, please close it manually"
                );
            }

            CoreEvent::UsageUpdated {
                rule_id,
                used_seconds,
                limit_seconds,
            } => {
                debug!(
                    rule_id = %rule_id,
                    used_seconds,
                    limit_seconds,
                    "Usage updated"
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "wardend starting");

    if warden_util::is_mock_time_active() {
        warn!("Mock time is active, usage dates will not match the system clock");
    }

    let service = Service::new(&args)?;
    service.run().await
}
