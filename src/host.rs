//! Line-oriented host
//!
//! Each input line is a JSON request naming a session, an action and its
//! arguments. Trip actions go through the action catalog to the session's
//! runtime; a few host actions inspect or end sessions.

use crate::actions::{catalog, parse_action, ActionError};
use crate::config::Config;
use crate::db::{Database, DbError};
use crate::runtime::{DatabaseStorage, ProductionManager, SessionManager};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Invalid request: {0}")]
    BadRequest(#[from] serde_json::Error),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Session runtime error: {0}")]
    Runtime(String),
}

/// One input line
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub session: Option<String>,
    pub action: String,
    #[serde(default)]
    pub args: Value,
}

pub struct Host {
    db: Database,
    manager: ProductionManager,
    default_session: String,
}

impl Host {
    pub fn new(db: Database, config: &Config) -> Self {
        let manager = SessionManager::with_channel_capacity(
            DatabaseStorage::new(db.clone()),
            config.channel_capacity,
        )
        .with_idle_timeout(config.idle_timeout);
        Self {
            db,
            manager,
            default_session: config.default_session.clone(),
        }
    }

    pub fn default_session(&self) -> &str {
        &self.default_session
    }

    /// Handle one input line, always producing a JSON response
    pub async fn handle_line(&self, line: &str) -> Value {
        let request: ActionRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected malformed request line");
                return json!({ "error": HostError::from(e).to_string() });
            }
        };

        let session = request
            .session
            .clone()
            .unwrap_or_else(|| self.default_session.clone());
        let action = request.action.clone();

        match self.handle(&session, request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(session_id = %session, action = %action, error = %e, "Request failed");
                json!({ "session": session, "action": action, "error": e.to_string() })
            }
        }
    }

    async fn handle(&self, session: &str, request: ActionRequest) -> Result<Value, HostError> {
        match request.action.as_str() {
            "catalog" => Ok(json!({ "catalog": catalog() })),
            "sessions" => {
                let sessions = self.db.list_sessions()?;
                Ok(json!({ "sessions": sessions }))
            }
            "history" => {
                let messages = self.db.get_messages(session)?;
                Ok(json!({ "session": session, "messages": messages }))
            }
            "endSession" => {
                let was_running = self.manager.end_session(session).await;
                let was_stored = match self.db.delete_session(session) {
                    Ok(()) => true,
                    Err(DbError::SessionNotFound(_)) => false,
                    Err(e) => return Err(e.into()),
                };
                Ok(json!({ "session": session, "ended": was_running || was_stored }))
            }
            name => {
                let event = parse_action(name, request.args)?;
                let outputs = self
                    .manager
                    .dispatch(session, event)
                    .await
                    .map_err(HostError::Runtime)?;
                Ok(json!({ "session": session, "action": name, "outputs": outputs }))
            }
        }
    }
}
