//! Merge of live snapshot entries with registered inventory records for map
//! display.

use crate::core::domain::model::server_record::ServerRecord;
use crate::core::domain::model::snapshot::{DashboardSnapshot, ServerHealth, ServerStatus};
use std::collections::HashSet;

/// Display status of a map marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStatus {
    Online,
    Offline,
    Unknown,
}

/// One mappable server with resolved coordinates and status.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLocation {
    pub id: String,
    pub hostname: String,
    pub name: String,
    pub status: MapStatus,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub host: String,
    pub description: Option<String>,
}

/// Combines live servers carrying coordinates with registered inventory
/// records, deduplicated by host identity.
///
/// Live entries win over inventory entries for the same host. Inventory-only
/// entries borrow their status from a matching live server (by host
/// substring of the agent URL, or hostname equal to the record name) and
/// fall back to [`MapStatus::Unknown`]. Entries with no usable coordinates
/// are excluded, never defaulted to (0, 0). An absent snapshot yields the
/// inventory-only view.
pub fn merge_locations(
    snapshot: Option<&DashboardSnapshot>,
    inventory: &[ServerRecord],
) -> Vec<MapLocation> {
    let live: &[ServerStatus] = snapshot
        .map(|s| s.servers.servers.as_slice())
        .unwrap_or_default();

    let mut merged = Vec::new();
    let mut seen_hosts = HashSet::new();

    for server in live {
        let (Some(latitude), Some(longitude)) = (server.latitude, server.longitude) else {
            continue;
        };
        if latitude == 0.0 && longitude == 0.0 {
            continue;
        }

        let host = extract_host(&server.url);
        if !seen_hosts.insert(host.clone()) {
            continue;
        }

        let metrics_hostname = server.metrics.as_ref().map(|m| m.hostname.clone());
        merged.push(MapLocation {
            id: format!("live-{}", host),
            hostname: metrics_hostname
                .clone()
                .or_else(|| server.name.clone())
                .unwrap_or_else(|| host.clone()),
            name: server
                .name
                .clone()
                .or(metrics_hostname)
                .unwrap_or_else(|| "Unknown Server".to_string()),
            status: collapse_status(server.status),
            location: server
                .location
                .clone()
                .unwrap_or_else(|| "Unknown Location".to_string()),
            latitude,
            longitude,
            host,
            description: None,
        });
    }

    for record in inventory {
        let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
            continue;
        };
        if latitude == 0.0 && longitude == 0.0 {
            continue;
        }
        if !seen_hosts.insert(record.host.clone()) {
            continue;
        }

        // Borrow the live status when any live server matches this record.
        let live_match = live.iter().find(|server| {
            server.url.contains(&record.host)
                || server
                    .metrics
                    .as_ref()
                    .is_some_and(|m| m.hostname == record.name)
        });

        merged.push(MapLocation {
            id: record.id.clone(),
            hostname: live_match
                .and_then(|s| s.metrics.as_ref().map(|m| m.hostname.clone()))
                .unwrap_or_else(|| record.name.clone()),
            name: record.name.clone(),
            status: live_match
                .map(|s| collapse_status(s.status))
                .unwrap_or(MapStatus::Unknown),
            location: record
                .location
                .clone()
                .unwrap_or_else(|| "Unknown Location".to_string()),
            latitude,
            longitude,
            host: record.host.clone(),
            description: record.description.clone(),
        });
    }

    merged
}

/// Collapses the four-way health classification to the three map states.
pub fn collapse_status(status: ServerHealth) -> MapStatus {
    match status {
        ServerHealth::Online => MapStatus::Online,
        ServerHealth::Offline => MapStatus::Offline,
        ServerHealth::Warning | ServerHealth::Alert => MapStatus::Unknown,
    }
}

/// Host identity of an agent URL: the `@host:` segment when present,
/// otherwise the whole URL.
fn extract_host(url: &str) -> String {
    if let Some(at) = url.find('@') {
        let rest = &url[at + 1..];
        if let Some(colon) = rest.find(':') {
            return rest[..colon].to_string();
        }
    }
    url.to_string()
}
