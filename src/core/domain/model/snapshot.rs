//! Domain models for the fleet snapshot delivered over the dashboard stream.
//!
//! A snapshot is one consistent view of the entire monitored fleet at a point
//! in time. It is published to consumers as a whole: all fields come from the
//! same inbound event, never from a partial merge.

use crate::core::domain::model::metrics::ServerMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One consistent, atomically-published view of the monitored fleet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardSnapshot {
    /// Fleet-wide aggregates.
    pub stats: DashboardStats,
    /// Per-server live status.
    pub servers: ServerStatusList,
    /// Currently known alerts.
    #[serde(default)]
    pub alerts: Vec<Alert>,
    /// Backend self-reported health.
    pub health: HealthInfo,
}

/// Fleet-wide aggregate statistics.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardStats {
    pub total_servers: u32,
    pub online_servers: u32,
    pub offline_servers: u32,
    pub alert_count: u32,
    /// Average CPU usage across the fleet (0.0 to 100.0).
    pub avg_cpu: f64,
    /// Average memory usage across the fleet (0.0 to 100.0).
    pub avg_memory: f64,
    /// Average disk usage across the fleet (0.0 to 100.0).
    pub avg_disk: f64,
}

/// The monitored server list plus its total count.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerStatusList {
    #[serde(default)]
    pub servers: Vec<ServerStatus>,
    pub total: u32,
}

/// Live status of one monitored server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerStatus {
    /// Agent endpoint URL the backend polls for this server.
    pub url: String,
    /// Current health classification.
    pub status: ServerHealth,
    /// Latest metric record, absent while the server is unreachable.
    #[serde(default)]
    pub metrics: Option<ServerMetrics>,
    /// When the backend last heard from this server (RFC 3339).
    pub last_update: String,
    /// Display name, if registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable location label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Health classification of a monitored server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerHealth {
    Online,
    Offline,
    Warning,
    Alert,
}

/// An alert raised by the backend for one server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Alert {
    pub id: String,
    pub server_url: String,
    pub hostname: String,
    /// Which resource triggered the alert.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub subject: String,
    pub message: String,
    pub is_active: bool,
    /// When the alert fired (RFC 3339).
    pub triggered_at: String,
    /// When the alert cleared, if it has (RFC 3339).
    #[serde(default)]
    pub resolved_at: Option<String>,
}

/// Resource class an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Memory,
    Disk,
    Process,
    Cpu,
}

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// Backend self-reported health summary.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthInfo {
    pub status: SystemHealth,
    /// Per-server health entries keyed by agent URL.
    #[serde(default)]
    pub servers: HashMap<String, HealthServerEntry>,
    pub total: u32,
    pub online: u32,
    pub offline: u32,
    pub alerts: u32,
}

/// Overall backend health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemHealth {
    Ok,
    Degraded,
    Error,
}

/// One entry of the health summary's per-server map.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthServerEntry {
    pub url: String,
    pub hostname: String,
    pub status: String,
}

/// Wire envelope of the named `dashboard` stream event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardEvent {
    /// Event discriminator as sent by the backend.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Backend-side emission time (RFC 3339).
    pub timestamp: String,
    pub data: DashboardSnapshot,
}

/// Wire envelope of the unnamed fallback message event.
///
/// Generic messages carry no guaranteed timestamp; the client stamps its own
/// arrival time when applying one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenericEvent {
    pub data: DashboardSnapshot,
}
