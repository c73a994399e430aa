//! Domain models for per-server metric records.
//!
//! These structures mirror the JSON emitted by the monitoring backend for a
//! single agent. They are purely data-carrying: produced externally and
//! consumed read-only by projections.

use serde::{Deserialize, Serialize};

/// Full metric record for one monitored server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerMetrics {
    /// Hostname reported by the agent.
    pub hostname: String,
    /// System uptime in seconds.
    pub uptime_seconds: u64,
    /// Memory usage.
    pub memory: MemoryStats,
    /// Per-filesystem disk usage.
    #[serde(default)]
    pub disks: Vec<DiskStats>,
    /// Network interface counters and rates.
    pub network: NetworkStats,
    /// Heaviest processes by resident memory.
    #[serde(default)]
    pub top_processes_by_memory: Vec<ProcessMemory>,
    /// When the agent generated this record (RFC 3339, UTC).
    pub generated_at_utc: String,
}

/// Memory usage in bytes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    /// Used memory as a percentage (0.0 to 100.0).
    pub used_percent: f64,
}

/// Disk usage for one mounted filesystem.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DiskStats {
    /// Block device (e.g., "/dev/sda1").
    pub device: String,
    /// Mount point (e.g., "/var").
    pub mountpoint: String,
    /// Filesystem type (e.g., "ext4").
    pub fstype: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    /// Used space as a percentage (0.0 to 100.0).
    pub used_percent: f64,
}

/// Aggregate network counters plus per-interface detail.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NetworkStats {
    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,
    /// Cumulative bytes sent across all interfaces.
    pub total_bytes_sent: u64,
    /// Cumulative bytes received across all interfaces.
    pub total_bytes_recv: u64,
    /// Current send rate in bytes per second.
    pub bytes_sent_rate: f64,
    /// Current receive rate in bytes per second.
    pub bytes_recv_rate: f64,
}

/// Counters for a single network interface.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NetworkInterface {
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
}

/// One entry of the top-processes-by-memory list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessMemory {
    pub pid: u32,
    pub name: String,
    pub username: String,
    /// Resident set size in bytes.
    pub rss_bytes: u64,
    /// Share of total RAM (0.0 to 100.0).
    pub percent_ram: f64,
    pub cmdline: String,
}
