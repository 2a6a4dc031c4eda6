//! Session runtime executor

use super::traits::Storage;
use super::SessionOutput;

use crate::state_machine::{transition, Effect, Event, SessionContext, TripRequest};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// Failures executing effects against the host
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Failed to deliver message: {0}")]
    Say(String),
    #[error("Failed to commit trip request: {0}")]
    Commit(String),
}

/// Runs one planning session: applies events in arrival order and executes
/// the resulting effects before taking the next event.
pub struct SessionRuntime<S>
where
    S: Storage + 'static,
{
    context: SessionContext,
    state: TripRequest,
    storage: S,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<SessionOutput>,
    idle_timeout: Option<Duration>,
}

impl<S> SessionRuntime<S>
where
    S: Storage + 'static,
{
    pub fn new(
        context: SessionContext,
        state: TripRequest,
        storage: S,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<SessionOutput>,
    ) -> Self {
        Self {
            context,
            state,
            storage,
            event_rx,
            broadcast_tx,
            idle_timeout: None,
        }
    }

    /// Stop the runtime after this long without an event
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    /// Current trip request
    #[allow(dead_code)] // Inspected by tests
    pub fn state(&self) -> &TripRequest {
        &self.state
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");

        // One event at a time; the next is not received until effects finish
        while let Some(event) = self.next_event().await {
            if let Err(e) = self.process_event(event).await {
                tracing::error!(
                    session_id = %self.context.session_id,
                    error = %e,
                    "Error handling event"
                );
                let _ = self.broadcast_tx.send(SessionOutput::Error {
                    message: e.to_string(),
                });
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    async fn next_event(&mut self) -> Option<Event> {
        let Some(idle_timeout) = self.idle_timeout else {
            return self.event_rx.recv().await;
        };

        match tokio::time::timeout(idle_timeout, self.event_rx.recv()).await {
            Ok(event) => event,
            Err(_) => {
                tracing::info!(session_id = %self.context.session_id, "Session runtime idle");
                // Refuse new events but still handle any queued before the close
                self.event_rx.close();
                self.event_rx.recv().await
            }
        }
    }

    pub async fn process_event(&mut self, event: Event) -> Result<(), RuntimeError> {
        let action = event.action_name();
        tracing::debug!(session_id = %self.context.session_id, action, "Processing event");

        // Pure state transition; kept aside until every effect succeeds
        let result = transition(&self.state, event);

        for effect in result.effects {
            self.execute_effect(effect, &result.new_state).await?;
        }
        self.state = result.new_state;

        tracing::info!(session_id = %self.context.session_id, action, "Action handled");
        let _ = self.broadcast_tx.send(SessionOutput::Done);
        Ok(())
    }

    async fn execute_effect(
        &self,
        effect: Effect,
        next_state: &TripRequest,
    ) -> Result<(), RuntimeError> {
        match effect {
            Effect::Say { text } => {
                self.storage
                    .say(&self.context.session_id, &text)
                    .await
                    .map_err(RuntimeError::Say)?;
                let _ = self.broadcast_tx.send(SessionOutput::Say { text });
            }
            Effect::Commit => {
                self.storage
                    .commit(&self.context.session_id, next_state)
                    .await
                    .map_err(RuntimeError::Commit)?;
                let _ = self.broadcast_tx.send(SessionOutput::Committed {
                    request: next_state.clone(),
                });
            }
        }
        Ok(())
    }
}
