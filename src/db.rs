//! Database module for the trip planner host
//!
//! Provides persistence for planning sessions and the messages said in them.

mod schema;

pub use schema::{SessionMessage, TripSession};
use schema::SCHEMA;

use crate::state_machine::TripRequest;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Failed to encode trip request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

const SESSION_COLUMNS: &str = "s.id, s.request, s.created_at, s.updated_at,
    (SELECT COUNT(*) FROM session_messages m WHERE m.session_id = s.id) as message_count";

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Create a new session with an empty trip request
    pub fn create_session(&self, id: &str) -> DbResult<TripSession> {
        let conn = self.lock()?;
        let now = Utc::now();
        let request = TripRequest::new();
        let request_json = serde_json::to_string(&request)?;

        conn.execute(
            "INSERT INTO trip_sessions (id, request, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![id, request_json, now.to_rfc3339()],
        )?;

        Ok(TripSession {
            id: id.to_string(),
            request,
            created_at: now,
            updated_at: now,
            message_count: 0,
        })
    }

    /// Get session by ID
    pub fn get_session(&self, id: &str) -> DbResult<TripSession> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM trip_sessions s WHERE s.id = ?1"
        ))?;

        stmt.query_row(params![id], parse_session_row)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::SessionNotFound(id.to_string()),
                other => DbError::Sqlite(other),
            })
    }

    /// Get a session, creating it empty if it does not exist yet
    pub fn ensure_session(&self, id: &str) -> DbResult<TripSession> {
        match self.get_session(id) {
            Err(DbError::SessionNotFound(_)) => {
                tracing::debug!(session_id = %id, "Creating session");
                self.create_session(id)
            }
            other => other,
        }
    }

    /// List sessions, most recently updated first
    pub fn list_sessions(&self) -> DbResult<Vec<TripSession>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM trip_sessions s ORDER BY s.updated_at DESC"
        ))?;

        let rows = stmt.query_map([], parse_session_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Replace the stored trip request for a session
    pub fn save_request(&self, id: &str, request: &TripRequest) -> DbResult<()> {
        let conn = self.lock()?;
        let now = Utc::now();
        let request_json = serde_json::to_string(request)?;

        let updated = conn.execute(
            "UPDATE trip_sessions SET request = ?1, updated_at = ?2 WHERE id = ?3",
            params![request_json, now.to_rfc3339(), id],
        )?;

        if updated == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete a session and all its messages
    pub fn delete_session(&self, id: &str) -> DbResult<()> {
        let conn = self.lock()?;

        // Messages are deleted by CASCADE
        let deleted = conn.execute("DELETE FROM trip_sessions WHERE id = ?1", params![id])?;

        if deleted == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    // ==================== Message Operations ====================

    /// Append a message to a session's log
    pub fn add_message(&self, session_id: &str, content: &str) -> DbResult<SessionMessage> {
        let conn = self.lock()?;
        let now = Utc::now();
        let message_id = uuid::Uuid::new_v4().to_string();

        let sequence_id: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sequence_id), 0) + 1 FROM session_messages WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO session_messages (message_id, session_id, sequence_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![message_id, session_id, sequence_id, content, now.to_rfc3339()],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::SessionNotFound(session_id.to_string())
            }
            other => DbError::Sqlite(other),
        })?;

        conn.execute(
            "UPDATE trip_sessions SET updated_at = ?1 WHERE id = ?2",
            params![now.to_rfc3339(), session_id],
        )?;

        Ok(SessionMessage {
            message_id,
            session_id: session_id.to_string(),
            sequence_id,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get messages for a session in delivery order
    pub fn get_messages(&self, session_id: &str) -> DbResult<Vec<SessionMessage>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT message_id, session_id, sequence_id, content, created_at
             FROM session_messages WHERE session_id = ?1 ORDER BY sequence_id ASC",
        )?;

        let rows = stmt.query_map(params![session_id], parse_message_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn parse_session_row(row: &Row<'_>) -> rusqlite::Result<TripSession> {
    let request_json: String = row.get(1)?;
    let request: TripRequest = serde_json::from_str(&request_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(TripSession {
        id: row.get(0)?,
        request,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
        message_count: row.get(4)?,
    })
}

fn parse_message_row(row: &Row<'_>) -> rusqlite::Result<SessionMessage> {
    Ok(SessionMessage {
        message_id: row.get(0)?,
        session_id: row.get(1)?,
        sequence_id: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
