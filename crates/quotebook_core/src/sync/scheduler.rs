//! Periodic reconciliation trigger.
//!
//! # Responsibility
//! - Run `Reconciler::sync_shared` on a fixed interval on a background thread.
//! - Report every cycle outcome as a `SyncEvent` notification.
//!
//! # Invariants
//! - A failed cycle never stops the schedule.
//! - Cycles run one after another on the scheduler thread.
//! - The first cycle fires one full interval after `start`.

use crate::repo::kv_repo::KeyValueRepository;
use crate::service::quote_store::QuoteStore;
use crate::sync::reconciler::{Reconciler, SyncReport};
use crate::sync::remote::RemoteSource;
use crossbeam_channel::{select, tick, unbounded, Sender};
use log::{debug, error, info};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default reconciliation interval (5 minutes).
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Outcome notification for one scheduled cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Synced(SyncReport),
    Failed(String),
}

/// Handle to a running sync thread. Dropping it stops the schedule.
pub struct SyncScheduler {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Spawns the scheduler thread.
    ///
    /// `events` receives one `SyncEvent` per cycle; a dropped receiver is
    /// tolerated.
    pub fn start<S, R>(
        reconciler: Arc<Reconciler<S>>,
        store: Arc<Mutex<QuoteStore<R>>>,
        interval: Duration,
        events: Sender<SyncEvent>,
    ) -> std::io::Result<Self>
    where
        S: RemoteSource + 'static,
        R: KeyValueRepository + Send + 'static,
    {
        let (stop_tx, stop_rx) = unbounded::<()>();
        let handle = thread::Builder::new()
            .name("quotebook-sync".to_string())
            .spawn(move || {
                info!(
                    "event=sync_scheduler module=sync status=start interval_ms={}",
                    interval.as_millis()
                );
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            let event = match reconciler.sync_shared(&store) {
                                Ok(report) => SyncEvent::Synced(report),
                                Err(err) => {
                                    error!("event=sync_scheduler module=sync status=cycle_failed error={err}");
                                    SyncEvent::Failed(err.to_string())
                                }
                            };
                            if events.send(event).is_err() {
                                debug!("event=sync_scheduler module=sync status=no_listener");
                            }
                        }
                    }
                }
                info!("event=sync_scheduler module=sync status=stopped");
            })?;

        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stops the schedule and waits for an in-flight cycle to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=sync_scheduler module=sync status=error reason=thread_panicked");
            }
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
