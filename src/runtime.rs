//! Runtime for hosting planning sessions
//!
//! Each session gets its own task and event channel. The task owns the
//! session's trip request, so nothing is shared between sessions and events
//! within one session never interleave.
//!
//! A runtime that sees no events for its idle timeout stops its task. The
//! next event for that session starts a fresh runtime from the last committed
//! request.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::{DatabaseStorage, StateStore, Storage};

use crate::state_machine::{Event, SessionContext, TripRequest};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Default event channel capacity per session
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Default time a session runtime waits for an event before stopping
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

const BROADCAST_CAPACITY: usize = 128;

/// Type alias for production runtime with concrete implementations
pub type ProductionManager = SessionManager<DatabaseStorage>;

/// Outputs broadcast to session subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionOutput {
    /// A message for the user
    Say { text: String },
    /// The trip request was persisted
    Committed { request: TripRequest },
    /// All effects of one event have been executed
    Done,
    Error { message: String },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<SessionOutput>,
}

impl SessionHandle {
    /// Whether the runtime behind this handle still accepts events
    fn is_live(&self) -> bool {
        !self.event_tx.is_closed()
    }
}

/// Manager for all session runtimes
pub struct SessionManager<S>
where
    S: Storage + Clone + 'static,
{
    storage: S,
    channel_capacity: usize,
    idle_timeout: Duration,
    runtimes: RwLock<HashMap<String, SessionHandle>>,
}

impl<S> SessionManager<S>
where
    S: Storage + Clone + 'static,
{
    #[allow(dead_code)] // Used by tests
    pub fn new(storage: S) -> Self {
        Self::with_channel_capacity(storage, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_channel_capacity(storage: S, channel_capacity: usize) -> Self {
        Self {
            storage,
            channel_capacity: channel_capacity.max(1),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Get or create a runtime for a session
    ///
    /// A new runtime resumes from the last committed request, if any.
    pub async fn get_or_create(&self, session_id: &str) -> Result<SessionHandle, String> {
        // Check if already running
        {
            let runtimes = self.runtimes.read().await;
            if let Some(handle) = runtimes.get(session_id).filter(|h| h.is_live()) {
                return Ok(handle.clone());
            }
        }

        let mut runtimes = self.runtimes.write().await;
        // Drop handles of runtimes that stopped after going idle
        runtimes.retain(|_, handle| handle.is_live());
        // Another caller may have started it while we waited for the lock
        if let Some(handle) = runtimes.get(session_id) {
            return Ok(handle.clone());
        }

        let initial_state = self.storage.load(session_id).await?;
        let resumed = initial_state.is_some();
        let initial_state = initial_state.unwrap_or_default();

        let (event_tx, event_rx) = mpsc::channel(self.channel_capacity);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        let runtime = SessionRuntime::new(
            SessionContext::new(session_id),
            initial_state,
            self.storage.clone(),
            event_rx,
            broadcast_tx.clone(),
        )
        .with_idle_timeout(self.idle_timeout);

        tracing::info!(session_id = %session_id, resumed, "Creating session runtime");
        tokio::spawn(runtime.run());

        let handle = SessionHandle {
            event_tx,
            broadcast_tx,
        };
        runtimes.insert(session_id.to_string(), handle.clone());
        Ok(handle)
    }

    /// Send an event to a session
    #[allow(dead_code)] // Used by tests
    pub async fn send_event(&self, session_id: &str, event: Event) -> Result<(), String> {
        self.deliver(session_id, event).await.map(drop)
    }

    /// Subscribe to a live runtime and hand it the event
    ///
    /// If the runtime stopped between lookup and send, the event goes to a
    /// freshly started one instead.
    async fn deliver(
        &self,
        session_id: &str,
        event: Event,
    ) -> Result<broadcast::Receiver<SessionOutput>, String> {
        let handle = self.get_or_create(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        let Err(SendError(event)) = handle.event_tx.send(event).await else {
            return Ok(rx);
        };

        tracing::debug!(session_id = %session_id, "Runtime stopped before send, restarting");
        let handle = self.get_or_create(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))?;
        Ok(rx)
    }

    /// Subscribe to session outputs
    #[allow(dead_code)] // Used by tests
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<broadcast::Receiver<SessionOutput>, String> {
        let handle = self.get_or_create(session_id).await?;
        Ok(handle.broadcast_tx.subscribe())
    }

    /// Send an event and collect its outputs through `Done` or `Error`
    ///
    /// Assumes the caller is the only one dispatching to this session;
    /// concurrent dispatchers would see each other's outputs.
    pub async fn dispatch(
        &self,
        session_id: &str,
        event: Event,
    ) -> Result<Vec<SessionOutput>, String> {
        let mut rx = self.deliver(session_id, event).await?;

        let mut outputs = Vec::new();
        loop {
            match rx.recv().await {
                Ok(output) => {
                    let finished =
                        matches!(output, SessionOutput::Done | SessionOutput::Error { .. });
                    outputs.push(output);
                    if finished {
                        return Ok(outputs);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(session_id = %session_id, skipped, "Session output lagged");
                }
                Err(RecvError::Closed) => {
                    return Err(format!("Session {session_id} closed"));
                }
            }
        }
    }

    /// Stop a session's runtime. Its task exits once queued events drain.
    pub async fn end_session(&self, session_id: &str) -> bool {
        let removed = self.runtimes.write().await.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id = %session_id, "Ended session runtime");
        }
        removed
    }

    /// IDs of sessions with a live runtime
    #[allow(dead_code)] // Used by tests
    pub async fn active_sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .runtimes
            .read()
            .await
            .iter()
            .filter(|(_, handle)| handle.is_live())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}
