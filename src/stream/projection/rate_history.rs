//! Bounded per-server network-rate history for bandwidth charts.

use crate::core::domain::model::snapshot::DashboardSnapshot;
use std::collections::BTreeMap;
use std::collections::VecDeque;
use time::OffsetDateTime;

/// Default number of points the window retains.
pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// One observation: combined send+receive rate in KB/s per hostname.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePoint {
    pub time: OffsetDateTime,
    pub rates: BTreeMap<String, f64>,
}

/// Fixed-size window of network-rate observations, oldest first.
///
/// Unlike the other projections this one is stateful across snapshots, so it
/// must observe them in arrival order — it belongs on a single ordered
/// subscription to the store. Reordered observations produce incorrect
/// charts.
#[derive(Debug, Clone)]
pub struct RateHistory {
    capacity: usize,
    points: VecDeque<RatePoint>,
}

impl RateHistory {
    /// Creates a window with [`DEFAULT_WINDOW_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    /// Creates a window retaining the `capacity` most recent points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Records one snapshot observation stamped with the current wall clock.
    ///
    /// An absent snapshot is a no-op: the window keeps its current contents.
    pub fn observe(&mut self, snapshot: Option<&DashboardSnapshot>) {
        self.observe_at(snapshot, OffsetDateTime::now_utc());
    }

    /// Records one snapshot observation with an explicit timestamp.
    pub fn observe_at(&mut self, snapshot: Option<&DashboardSnapshot>, time: OffsetDateTime) {
        let Some(snapshot) = snapshot else {
            return;
        };

        let mut rates = BTreeMap::new();
        for server in &snapshot.servers.servers {
            if let Some(metrics) = &server.metrics {
                let network = &metrics.network;
                let kb_per_sec = (network.bytes_sent_rate + network.bytes_recv_rate) / 1024.0;
                rates.insert(metrics.hostname.clone(), kb_per_sec);
            }
        }

        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(RatePoint { time, rates });
    }

    /// Points currently in the window, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &RatePoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RateHistory {
    fn default() -> Self {
        Self::new()
    }
}
