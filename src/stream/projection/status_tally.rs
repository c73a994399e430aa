//! Stateless status counts over the current server list.

use crate::core::domain::model::snapshot::DashboardSnapshot;
use crate::stream::projection::geo_merge::{MapStatus, collapse_status};

/// Counts of servers by collapsed display status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTally {
    pub online: usize,
    pub offline: usize,
    pub unknown: usize,
}

impl StatusTally {
    pub fn total(&self) -> usize {
        self.online + self.offline + self.unknown
    }
}

/// Recomputed fresh from each snapshot; no memory of past snapshots.
/// An absent snapshot tallies to all zeroes.
pub fn tally_status(snapshot: Option<&DashboardSnapshot>) -> StatusTally {
    let mut tally = StatusTally::default();
    let Some(snapshot) = snapshot else {
        return tally;
    };

    for server in &snapshot.servers.servers {
        match collapse_status(server.status) {
            MapStatus::Online => tally.online += 1,
            MapStatus::Offline => tally.offline += 1,
            MapStatus::Unknown => tally.unknown += 1,
        }
    }
    tally
}
