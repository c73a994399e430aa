mod core;
mod inventory;
mod stream;

pub use crate::core::domain::backoff::BackoffPolicy;
pub use crate::core::domain::error::{FleetError, FleetResult, ValidationError};
pub use crate::core::domain::model::connection::{ConnectionPhase, ConnectionState};
pub use crate::core::domain::model::metrics::{
    DiskStats, MemoryStats, NetworkInterface, NetworkStats, ProcessMemory, ServerMetrics,
};
pub use crate::core::domain::model::server_record::{ServerRecord, ServerRecordList};
pub use crate::core::domain::model::snapshot::{
    Alert, AlertKind, AlertSeverity, DashboardSnapshot, DashboardStats, HealthInfo,
    HealthServerEntry, ServerHealth, ServerStatus, ServerStatusList, SystemHealth,
};
pub use crate::core::domain::value_object::EndpointUrl;
pub use crate::core::infrastructure::api_client::RateLimitConfig;
pub use crate::inventory::application::request::{CreateServerRequest, UpdateServerRequest};
pub use crate::inventory::application::response::ApiEnvelope;
pub use crate::inventory::application::service::InventoryService;
pub use crate::inventory::poller::{DEFAULT_POLL_INTERVAL, InventoryPoller};
pub use crate::stream::projection;
pub use crate::stream::store::StoreState;

use crate::stream::manager::{Command, StreamManager};
use crate::stream::store::SnapshotStore;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const STREAM_PATH: &str = "api/v1/sse/dashboard";
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Resolves the collaborator base URL from the environment, read once at
/// startup: `FLEETWATCH_API_URL`, then `FLEETWATCH_API_BASE_URL`, then the
/// localhost default.
pub(crate) fn api_base_url_from_env() -> String {
    std::env::var("FLEETWATCH_API_URL")
        .or_else(|_| std::env::var("FLEETWATCH_API_BASE_URL"))
        .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

/// A session against a live infrastructure-monitoring backend.
///
/// The session owns the push-connection lifecycle: it keeps exactly one
/// logical stream connection alive, retries lost connections with bounded
/// exponential backoff, and fans consistent fleet snapshots out to any
/// number of subscribers. Connection trouble is surfaced as state alongside
/// the last-known snapshot, never as an error that interrupts consumers.
///
/// # Examples
///
/// ```no_run
/// use fleetwatch::{StreamSession, FleetResult, projection};
///
/// #[tokio::main]
/// async fn main() -> FleetResult<()> {
///     let mut session = StreamSession::builder()
///         .api_url("http://monitor.example.com:8080")
///         .build()?;
///     session.start()?;
///
///     let mut updates = session.subscribe();
///     let mut bandwidth = projection::RateHistory::new();
///     while updates.changed().await.is_ok() {
///         let state = updates.borrow_and_update().clone();
///         bandwidth.observe(state.snapshot.as_deref());
///         let tally = projection::tally_status(state.snapshot.as_deref());
///         println!("online: {}, offline: {}", tally.online, tally.offline);
///     }
///
///     session.stop();
///     Ok(())
/// }
/// ```
pub struct StreamSession {
    store: Arc<SnapshotStore>,
    stream_url: EndpointUrl,
    backoff: BackoffPolicy,
    max_attempts: u32,
    commands: Option<mpsc::UnboundedSender<Command>>,
    handle: Option<JoinHandle<()>>,
}

/// Builder for StreamSession configuration
#[derive(Debug, Default)]
pub struct StreamSessionBuilder {
    api_url: Option<String>,
    stream_url: Option<String>,
    backoff: Option<BackoffPolicy>,
    max_attempts: Option<u32>,
}

impl StreamSessionBuilder {
    /// Sets the backend base URL; the stream endpoint is derived from it
    /// unless [`stream_url`](Self::stream_url) overrides it.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets an explicit stream endpoint URL.
    pub fn stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = Some(url.into());
        self
    }

    /// Overrides the reconnect backoff policy.
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Overrides the automatic-reconnect ceiling (default 5).
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Fills unset URLs from `FLEETWATCH_API_URL` /
    /// `FLEETWATCH_API_BASE_URL` / `FLEETWATCH_STREAM_URL`.
    pub fn from_env(mut self) -> Self {
        if self.api_url.is_none() {
            self.api_url = Some(api_base_url_from_env());
        }
        if self.stream_url.is_none() {
            self.stream_url = std::env::var("FLEETWATCH_STREAM_URL").ok();
        }
        self
    }

    /// Validates the configuration and builds a (not yet started) session.
    ///
    /// # Errors
    /// Returns `FleetError::Validation` if the configured URL is invalid.
    pub fn build(self) -> FleetResult<StreamSession> {
        let stream_url = match self.stream_url {
            Some(url) => EndpointUrl::new(url)?,
            None => {
                let base = EndpointUrl::new(
                    self.api_url
                        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                )?;
                EndpointUrl::new(base.join(STREAM_PATH))?
            }
        };

        Ok(StreamSession {
            store: Arc::new(SnapshotStore::new()),
            stream_url,
            backoff: self.backoff.unwrap_or_default(),
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            commands: None,
            handle: None,
        })
    }
}

impl StreamSession {
    /// Creates a new builder for StreamSession configuration
    pub fn builder() -> StreamSessionBuilder {
        StreamSessionBuilder::default()
    }

    /// Opens the push connection and begins delivering snapshots.
    ///
    /// Idempotent while running. The connection manager task is owned by
    /// this session and is torn down by [`stop`](Self::stop) or drop.
    ///
    /// # Errors
    /// Returns `FleetError::Connection` if the HTTP client cannot be built.
    pub fn start(&mut self) -> FleetResult<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| FleetError::Connection(e.to_string()))?;

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let handle = StreamManager::spawn(
            http_client,
            self.stream_url.clone(),
            Arc::clone(&self.store),
            self.backoff,
            self.max_attempts,
            commands_rx,
        );

        self.commands = Some(commands_tx);
        self.handle = Some(handle);
        Ok(())
    }

    /// Forces an immediate reconnect, valid from any state.
    ///
    /// Tears down the live connection or pending backoff sleep, resets the
    /// attempt counter, and connects without delay. Also the only way out of
    /// the exhausted state. A no-op unless the session is running.
    pub fn reconnect(&self) {
        if let Some(commands) = &self.commands {
            let _ = commands.send(Command::Reconnect);
        }
    }

    /// Closes the connection and cancels any pending reconnect.
    ///
    /// No state transitions are published after this returns.
    pub fn stop(&mut self) {
        self.commands = None;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Returns `true` while the connection manager task is running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns a receiver observing every published store value.
    ///
    /// Every subscriber sees the same atomically-replaced values; a
    /// subscriber can never observe a half-applied snapshot.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.store.subscribe()
    }

    /// Returns a clone of the latest store value.
    pub fn current(&self) -> StoreState {
        self.store.current()
    }

    /// Returns the stream endpoint this session connects to.
    pub fn stream_url(&self) -> &EndpointUrl {
        &self.stream_url
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests;
