//! Domain models for registered server records owned by the inventory
//! collaborator.
//!
//! The core only reads these records and merges them with live snapshot data
//! by host identity; persistence belongs to the collaborator.

use serde::{Deserialize, Serialize};

/// A registered server as returned by the inventory collaborator.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerRecord {
    pub id: String,
    pub name: String,
    /// Host or IP address used as the merge identity against live data.
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Agent URL the backend derived from host/port, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Comma-separated tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub is_active: bool,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last modification time (RFC 3339).
    pub updated_at: String,
}

/// A page of registered servers plus the total count.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerRecordList {
    #[serde(default)]
    pub servers: Vec<ServerRecord>,
    pub total: u32,
}
