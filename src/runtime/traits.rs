//! Trait abstractions for runtime I/O
//!
//! These are the two output channels of a session: messages said to the
//! user and commits of the trip request. Tests swap in mock implementations.

use crate::db::{Database, DbError};
use crate::state_machine::TripRequest;
use async_trait::async_trait;
use std::sync::Arc;

/// Delivery of user-facing messages
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver a message to the user of a session
    async fn say(&self, session_id: &str, text: &str) -> Result<(), String>;
}

/// Storage for trip requests
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist the current trip request for a session
    async fn commit(&self, session_id: &str, request: &TripRequest) -> Result<(), String>;

    /// Load the last committed request, or `None` for a new session
    async fn load(&self, session_id: &str) -> Result<Option<TripRequest>, String>;
}

/// Combined storage trait for convenience
pub trait Storage: MessageSink + StateStore {}
impl<T: MessageSink + StateStore> Storage for T {}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: MessageSink + ?Sized> MessageSink for Arc<T> {
    async fn say(&self, session_id: &str, text: &str) -> Result<(), String> {
        (**self).say(session_id, text).await
    }
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn commit(&self, session_id: &str, request: &TripRequest) -> Result<(), String> {
        (**self).commit(session_id, request).await
    }

    async fn load(&self, session_id: &str) -> Result<Option<TripRequest>, String> {
        (**self).load(session_id).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as Storage
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageSink for DatabaseStorage {
    async fn say(&self, session_id: &str, text: &str) -> Result<(), String> {
        self.db.ensure_session(session_id).map_err(|e| e.to_string())?;
        self.db
            .add_message(session_id, text)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl StateStore for DatabaseStorage {
    async fn commit(&self, session_id: &str, request: &TripRequest) -> Result<(), String> {
        self.db.ensure_session(session_id).map_err(|e| e.to_string())?;
        self.db
            .save_request(session_id, request)
            .map_err(|e| e.to_string())
    }

    async fn load(&self, session_id: &str) -> Result<Option<TripRequest>, String> {
        match self.db.get_session(session_id) {
            Ok(session) => Ok(Some(session.request)),
            Err(DbError::SessionNotFound(_)) => Ok(None),
            Err(e) => Err(e.to_string()),
        }
    }
}
