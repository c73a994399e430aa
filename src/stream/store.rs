//! Single authoritative holder of the latest snapshot and connection state.

use crate::core::domain::model::connection::ConnectionState;
use crate::core::domain::model::snapshot::{
    Alert, DashboardSnapshot, DashboardStats, HealthInfo, ServerStatus,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tokio::sync::watch;

/// The value fanned out to every subscriber: the latest snapshot (if any)
/// plus connection/error/staleness metadata.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Latest published snapshot. Shared, immutable once published.
    pub snapshot: Option<Arc<DashboardSnapshot>>,
    pub connection: ConnectionState,
}

impl StoreState {
    /// Fleet-wide aggregates, absent until the first snapshot arrives.
    pub fn stats(&self) -> Option<&DashboardStats> {
        self.snapshot.as_deref().map(|s| &s.stats)
    }

    /// Current server list, empty until the first snapshot arrives.
    pub fn servers(&self) -> &[ServerStatus] {
        self.snapshot
            .as_deref()
            .map(|s| s.servers.servers.as_slice())
            .unwrap_or_default()
    }

    /// Current alerts, empty until the first snapshot arrives.
    pub fn alerts(&self) -> &[Alert] {
        self.snapshot
            .as_deref()
            .map(|s| s.alerts.as_slice())
            .unwrap_or_default()
    }

    /// Backend health summary, absent until the first snapshot arrives.
    pub fn health(&self) -> Option<&HealthInfo> {
        self.snapshot.as_deref().map(|s| &s.health)
    }

    /// Returns `true` while the stream is established.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }
}

/// Watch-channel-backed store with one writer role and many readers.
///
/// Publishing replaces the whole stored value in a single assignment, so a
/// subscriber can never observe fields from two different inbound events.
/// Writes carry the connection-instance token of their originating
/// connection attempt; writes from a superseded instance are discarded,
/// which keeps a torn-down connection's stale in-flight events out of the
/// store across reconnects.
#[derive(Debug)]
pub(crate) struct SnapshotStore {
    state: watch::Sender<StoreState>,
    writer: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            state,
            writer: AtomicU64::new(0),
        }
    }

    /// Returns a receiver that observes every published value.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Returns a clone of the latest published value.
    pub fn current(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Makes `token` the only instance whose writes are accepted.
    pub fn claim_writer(&self, token: u64) {
        self.writer.store(token, Ordering::Release);
    }

    /// Atomically replaces the stored snapshot and stamps the update time.
    ///
    /// Returns `false` (leaving the store untouched) when `token` has been
    /// superseded by a newer connection attempt.
    pub fn publish_snapshot(
        &self,
        token: u64,
        snapshot: DashboardSnapshot,
        at: OffsetDateTime,
    ) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.writer.load(Ordering::Acquire) != token {
                return false;
            }
            let mut connection = state.connection.clone();
            connection.last_snapshot_time = Some(at);
            *state = StoreState {
                snapshot: Some(Arc::new(snapshot)),
                connection,
            };
            applied = true;
            true
        });
        applied
    }

    /// Atomically replaces the connection state, keeping the snapshot.
    ///
    /// Returns `false` when `token` has been superseded.
    pub fn update_connection(
        &self,
        token: u64,
        mutate: impl FnOnce(&mut ConnectionState),
    ) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.writer.load(Ordering::Acquire) != token {
                return false;
            }
            let mut connection = state.connection.clone();
            mutate(&mut connection);
            *state = StoreState {
                snapshot: state.snapshot.clone(),
                connection,
            };
            applied = true;
            true
        });
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::model::connection::ConnectionPhase;
    use crate::core::domain::model::snapshot::{ServerStatusList, SystemHealth};
    use std::collections::HashMap;
    use time::macros::datetime;

    fn snapshot(total: u32) -> DashboardSnapshot {
        DashboardSnapshot {
            stats: DashboardStats {
                total_servers: total,
                online_servers: total,
                offline_servers: 0,
                alert_count: 0,
                avg_cpu: 12.5,
                avg_memory: 40.0,
                avg_disk: 55.0,
            },
            servers: ServerStatusList {
                servers: Vec::new(),
                total,
            },
            alerts: Vec::new(),
            health: HealthInfo {
                status: SystemHealth::Ok,
                servers: HashMap::new(),
                total,
                online: total,
                offline: 0,
                alerts: 0,
            },
        }
    }

    #[test]
    fn test_publish_replaces_whole_value() {
        let store = SnapshotStore::new();
        store.claim_writer(1);
        let at = datetime!(2026-01-01 00:00:00 UTC);

        assert!(store.publish_snapshot(1, snapshot(3), at));
        assert!(store.publish_snapshot(1, snapshot(5), at));

        let state = store.current();
        assert_eq!(state.stats().unwrap().total_servers, 5);
        assert_eq!(state.connection.last_snapshot_time, Some(at));
    }

    #[test]
    fn test_superseded_writer_is_rejected() {
        let store = SnapshotStore::new();
        let at = datetime!(2026-01-01 00:00:00 UTC);

        store.claim_writer(1);
        assert!(store.publish_snapshot(1, snapshot(3), at));

        store.claim_writer(2);
        assert!(!store.publish_snapshot(1, snapshot(9), at));
        assert_eq!(store.current().stats().unwrap().total_servers, 3);

        assert!(store.publish_snapshot(2, snapshot(4), at));
        assert_eq!(store.current().stats().unwrap().total_servers, 4);
    }

    #[test]
    fn test_update_connection_keeps_snapshot() {
        let store = SnapshotStore::new();
        let at = datetime!(2026-01-01 00:00:00 UTC);
        store.claim_writer(1);
        store.publish_snapshot(1, snapshot(2), at);

        store.update_connection(1, |c| {
            c.phase = ConnectionPhase::Closed;
            c.last_error = Some("connection refused".to_string());
        });

        let state = store.current();
        assert_eq!(state.stats().unwrap().total_servers, 2);
        assert_eq!(state.connection.phase, ConnectionPhase::Closed);
        assert_eq!(
            state.connection.last_error.as_deref(),
            Some("connection refused")
        );
    }

    #[tokio::test]
    async fn test_subscribers_are_notified_once_per_publish() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();
        store.claim_writer(1);

        assert!(
            store.publish_snapshot(1, snapshot(1), datetime!(2026-01-01 00:00:00 UTC))
        );
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().stats().unwrap().total_servers,
            1
        );

        // A rejected write must not wake subscribers.
        store.claim_writer(2);
        assert!(!store.publish_snapshot(1, snapshot(7), datetime!(2026-01-01 00:00:00 UTC)));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_empty_state_accessors_default() {
        let state = StoreState::default();
        assert!(state.stats().is_none());
        assert!(state.servers().is_empty());
        assert!(state.alerts().is_empty());
        assert!(state.health().is_none());
        assert!(!state.is_connected());
    }
}
