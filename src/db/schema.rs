//! Database schema and types

use crate::state_machine::TripRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS trip_sessions (
    id TEXT PRIMARY KEY,
    request TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_trip_sessions_updated ON trip_sessions(updated_at DESC);

CREATE TABLE IF NOT EXISTS session_messages (
    message_id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    sequence_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (session_id) REFERENCES trip_sessions(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_session_messages_session ON session_messages(session_id, sequence_id);
";

/// Planning session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSession {
    pub id: String,
    pub request: TripRequest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
}

/// A message said to the user, in delivery order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub message_id: String,
    pub session_id: String,
    pub sequence_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
