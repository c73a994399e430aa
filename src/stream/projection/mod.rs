//! Pure derived views computed from the current snapshot for specific UI
//! needs.

mod geo_merge;
mod rate_history;
mod status_tally;

pub use geo_merge::{MapLocation, MapStatus, collapse_status, merge_locations};
pub use rate_history::{DEFAULT_WINDOW_CAPACITY, RateHistory, RatePoint};
pub use status_tally::{StatusTally, tally_status};
