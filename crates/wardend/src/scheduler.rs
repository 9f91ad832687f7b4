//! Fixed-interval cycle scheduler

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};
use warden_core::{CoreEvent, MonitorEngine};
use warden_store::Store;

/// Drives the enforcement cycle at a fixed interval.
///
/// The first fire happens immediately on start. Cycles run sequentially on
/// one task, so they never overlap. Stop disables future fires without
/// interrupting an in-flight cycle; start and stop are both idempotent.
pub struct Scheduler {
    engine: Arc<MonitorEngine>,
    store: Arc<dyn Store>,
    events: mpsc::UnboundedSender<CoreEvent>,
    shutdown: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(
        engine: Arc<MonitorEngine>,
        store: Arc<dyn Store>,
        events: mpsc::UnboundedSender<CoreEvent>,
    ) -> Self {
        Self {
            engine,
            store,
            events,
            shutdown: None,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start the periodic cycle.
    pub fn start(&mut self, interval: Duration) {
        if self.handle.is_some() {
            debug!("Scheduler already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let engine = self.engine.clone();
        let store = self.store.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        debug!("Scheduler stopping");
                        break;
                    }

                    _ = ticker.tick() => {
                        // A failing cycle must not stop future monitoring.
                        match engine.run_cycle(warden_util::now()) {
                            Ok(cycle_events) => {
                                for event in cycle_events {
                                    let _ = events.send(event);
                                }
                            }
                            Err(e) => error!(error = %e, "Enforcement cycle failed"),
                        }

                        match engine.flush_snapshot_if_due() {
                            Ok(Some(snapshot)) => {
                                // Fire-and-forget: the cycle never waits on disk.
                                let store = store.clone();
                                tokio::task::spawn_blocking(move || {
                                    if let Err(e) = store.save(&snapshot) {
                                        warn!(error = %e, "Periodic flush failed");
                                    }
                                });
                            }
                            Ok(None) => {}
                            Err(e) => warn!(error = %e, "Flush snapshot unavailable"),
                        }
                    }
                }
            }
        });

        self.shutdown = Some(shutdown_tx);
        self.handle = Some(handle);
    }

    /// Stop future fires and wait for the task to wind down.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_host::{MockHost, ProcessInfo};
    use warden_store::{AppData, MemoryStore, Rule, Settings};

    fn test_engine(host: Arc<MockHost>, store: Arc<MemoryStore>) -> Arc<MonitorEngine> {
        let data = AppData {
            rules: vec![Rule::new("game", 60, 10)],
            usage_records: Vec::new(),
            settings: Settings {
                polling_interval_seconds: 1,
                ..Default::default()
            },
        };
        Arc::new(MonitorEngine::new(data, store, host))
    }

    #[tokio::test]
    async fn fires_immediately_and_repeats() {
        let host = Arc::new(MockHost::with_processes(vec![ProcessInfo::new(10, "game")]));
        let store = Arc::new(MemoryStore::new());
        let engine = test_engine(host, store.clone());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(engine, store, tx);
        scheduler.start(Duration::from_millis(10));
        assert!(scheduler.is_running());

        // The immediate first fire plus at least one repeat.
        let first = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("first cycle should emit")
            .unwrap();
        assert!(matches!(first, CoreEvent::UsageUpdated { .. }));

        let second = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("second cycle should emit")
            .unwrap();
        assert!(matches!(second, CoreEvent::UsageUpdated { .. }));

        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let host = Arc::new(MockHost::new());
        let store = Arc::new(MemoryStore::new());
        let engine = test_engine(host, store.clone());

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(engine, store, tx);

        scheduler.start(Duration::from_millis(10));
        scheduler.start(Duration::from_millis(10));
        assert!(scheduler.is_running());

        scheduler.stop().await;
        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn stopped_scheduler_emits_no_further_events() {
        let host = Arc::new(MockHost::with_processes(vec![ProcessInfo::new(10, "game")]));
        let store = Arc::new(MemoryStore::new());
        let engine = test_engine(host, store.clone());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(engine, store, tx);
        scheduler.start(Duration::from_millis(10));

        // Let at least one cycle run, then stop and drain.
        let _ = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        scheduler.stop().await;
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }
}
