//! The stream connection manager: owns the single push-connection lifecycle.
//!
//! One spawned task drives an explicit state machine:
//!
//! ```text
//! CONNECTING → OPEN → CLOSED(retryable) → CONNECTING (after backoff)
//!                   ↘ CLOSED(exhausted) → CONNECTING (manual reconnect only)
//! ```
//!
//! The task is the only writer of the snapshot store, and every connection
//! attempt claims a fresh instance token there, so events from a superseded
//! connection can never reach subscribers. Manual reconnects and teardown
//! arrive over a command channel that interrupts whatever the task is doing,
//! including a pending backoff sleep.

use crate::core::domain::backoff::BackoffPolicy;
use crate::core::domain::error::FleetError;
use crate::core::domain::model::connection::ConnectionPhase;
use crate::core::domain::model::snapshot::{DashboardEvent, GenericEvent};
use crate::core::domain::value_object::EndpointUrl;
use crate::core::infrastructure::sse_codec::{SseDecoder, SseEvent};
use crate::stream::store::SnapshotStore;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Imperative commands accepted by the manager task.
#[derive(Debug)]
pub(crate) enum Command {
    /// Tear down any live connection or pending backoff sleep and connect
    /// immediately with a reset attempt counter.
    Reconnect,
}

/// Why a connection attempt ended.
enum Exit {
    /// The session was dropped or stopped; leave the loop without touching
    /// state again.
    Shutdown,
    /// A manual reconnect interrupted this attempt.
    Reconnect,
    /// Transport-level failure, carrying the error description.
    Failed(String),
}

pub(crate) struct StreamManager {
    http_client: reqwest::Client,
    stream_url: EndpointUrl,
    store: Arc<SnapshotStore>,
    backoff: BackoffPolicy,
    max_attempts: u32,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl StreamManager {
    pub fn spawn(
        http_client: reqwest::Client,
        stream_url: EndpointUrl,
        store: Arc<SnapshotStore>,
        backoff: BackoffPolicy,
        max_attempts: u32,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> JoinHandle<()> {
        let manager = Self {
            http_client,
            stream_url,
            store,
            backoff,
            max_attempts,
            commands,
        };
        tokio::spawn(manager.run())
    }

    async fn run(mut self) {
        let mut attempts: u32 = 0;
        let mut token: u64 = 0;

        loop {
            // Each attempt gets a fresh token; older instances lose write
            // access the moment this is claimed.
            token += 1;
            self.store.claim_writer(token);
            self.store.update_connection(token, |c| {
                c.phase = ConnectionPhase::Connecting;
                c.attempt_count = attempts;
                c.exhausted = false;
            });
            info!(url = %self.stream_url, attempt = attempts, "connecting to dashboard stream");

            let failure = match self.connect_once(token, &mut attempts).await {
                Exit::Shutdown => return,
                Exit::Reconnect => {
                    attempts = 0;
                    continue;
                }
                Exit::Failed(error) => error,
            };

            self.store.update_connection(token, |c| {
                c.phase = ConnectionPhase::Closed;
                c.last_error = Some(failure.clone());
            });

            if attempts < self.max_attempts {
                let delay = self.backoff.delay(attempts);
                attempts += 1;
                self.store
                    .update_connection(token, |c| c.attempt_count = attempts);
                warn!(
                    error = %failure,
                    attempt = attempts,
                    max_attempts = self.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "dashboard stream lost, reconnecting after backoff"
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    command = self.commands.recv() => match command {
                        Some(Command::Reconnect) => attempts = 0,
                        None => return,
                    }
                }
            } else {
                error!(
                    error = %failure,
                    attempts,
                    "dashboard stream reconnect attempts exhausted"
                );
                self.store.update_connection(token, |c| c.exhausted = true);
                // Terminal until an explicit reconnect arrives.
                match self.commands.recv().await {
                    Some(Command::Reconnect) => attempts = 0,
                    None => return,
                }
            }
        }
    }

    /// Runs one connection attempt to completion: open, then read events
    /// until the transport fails or a command interrupts.
    ///
    /// A successful open resets `attempts`, the retry counter owned by
    /// [`run`](Self::run).
    async fn connect_once(&mut self, token: u64, attempts: &mut u32) -> Exit {
        let request = self
            .http_client
            .get(self.stream_url.as_str())
            .header(ACCEPT, "text/event-stream");

        let open = async {
            let response = request
                .send()
                .await
                .map_err(|e| FleetError::Connection(format!("HTTP request failed: {}", e)))?;
            let status = response.status();
            if !status.is_success() {
                return Err(FleetError::Connection(format!(
                    "Unexpected response status: {}",
                    status
                )));
            }
            let is_event_stream = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.starts_with("text/event-stream"));
            if !is_event_stream {
                return Err(FleetError::Connection(
                    "Endpoint did not return an event stream".to_string(),
                ));
            }
            Ok(response)
        };
        tokio::pin!(open);

        let response = tokio::select! {
            command = self.commands.recv() => return Self::exit_for(command),
            result = &mut open => match result {
                Ok(response) => response,
                Err(e) => return Exit::Failed(e.to_string()),
            },
        };

        *attempts = 0;
        self.store.update_connection(token, |c| {
            c.phase = ConnectionPhase::Open;
            c.attempt_count = 0;
            c.last_error = None;
            c.exhausted = false;
        });
        info!("dashboard stream open");

        let mut frames = Box::pin(response.bytes_stream());
        let mut decoder = SseDecoder::new();
        loop {
            tokio::select! {
                command = self.commands.recv() => return Self::exit_for(command),
                chunk = frames.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for event in decoder.push(&bytes) {
                            Self::apply_event(&self.store, token, event);
                        }
                    }
                    Some(Err(e)) => return Exit::Failed(format!("Stream read failed: {}", e)),
                    None => return Exit::Failed("Stream closed by server".to_string()),
                }
            }
        }
    }

    /// Decodes one assembled event and publishes it to the store.
    ///
    /// A malformed payload drops that single event; the connection stays
    /// open and the store is untouched.
    fn apply_event(store: &SnapshotStore, token: u64, event: SseEvent) {
        let arrival = OffsetDateTime::now_utc();
        match event.name.as_deref() {
            Some("dashboard") => match serde_json::from_str::<DashboardEvent>(&event.data) {
                Ok(update) => {
                    let at = OffsetDateTime::parse(&update.timestamp, &Rfc3339).unwrap_or(arrival);
                    if store.publish_snapshot(token, update.data, at) {
                        debug!(timestamp = %update.timestamp, "dashboard snapshot applied");
                    }
                }
                Err(e) => warn!(error = %e, "dropping malformed dashboard event"),
            },
            // Unnamed fallback; the payload carries no trusted timestamp,
            // so the arrival time stands in.
            None | Some("message") => match serde_json::from_str::<GenericEvent>(&event.data) {
                Ok(update) => {
                    let _ = store.publish_snapshot(token, update.data, arrival);
                }
                Err(e) => warn!(error = %e, "dropping malformed message event"),
            },
            Some(other) => debug!(event = other, "ignoring unrecognized stream event"),
        }
    }

    fn exit_for(command: Option<Command>) -> Exit {
        match command {
            Some(Command::Reconnect) => Exit::Reconnect,
            None => Exit::Shutdown,
        }
    }
}
