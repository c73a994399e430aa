//! Fixed-interval background refresh of the registered-server list.

use crate::core::domain::model::server_record::ServerRecord;
use crate::inventory::application::service::InventoryService;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default refresh interval for the registered-server list.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Background task that polls the inventory collaborator on a fixed interval
/// and fans the latest list out through a watch channel.
///
/// The first fetch fires immediately. A failed poll logs a warning and keeps
/// the previous list; subscribers are only notified on successful refreshes.
/// Dropping the poller (or calling [`stop`](Self::stop)) cancels the task.
#[derive(Debug)]
pub struct InventoryPoller {
    records: watch::Receiver<Vec<ServerRecord>>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl InventoryPoller {
    /// Spawns the poll task with [`DEFAULT_POLL_INTERVAL`].
    pub fn spawn(service: InventoryService) -> Self {
        Self::spawn_with_interval(service, DEFAULT_POLL_INTERVAL)
    }

    /// Spawns the poll task with a custom interval.
    pub fn spawn_with_interval(service: InventoryService, interval: Duration) -> Self {
        let (records_tx, records_rx) = watch::channel(Vec::new());
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = tick.tick() => {}
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }

                match service.list().await {
                    Ok(list) => {
                        debug!(total = list.total, "inventory refreshed");
                        records_tx.send_replace(list.servers);
                    }
                    Err(e) => warn!(error = %e, "inventory poll failed, keeping previous list"),
                }
            }
            debug!("inventory poller stopped");
        });

        Self {
            records: records_rx,
            shutdown: shutdown_tx,
            handle,
        }
    }

    /// Returns a receiver tracking the latest fetched list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ServerRecord>> {
        self.records.clone()
    }

    /// Returns a clone of the latest fetched list.
    pub fn current(&self) -> Vec<ServerRecord> {
        self.records.borrow().clone()
    }

    /// Stops the poll task.
    pub fn stop(self) {
        let _ = self.shutdown.send(true);
        // Drop aborts the task as well; this just makes the exit prompt.
    }
}

impl Drop for InventoryPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
