//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use super::traits::{MessageSink, StateStore};
use crate::state_machine::TripRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ============================================================================
// In-memory Storage
// ============================================================================

#[derive(Default)]
struct MemoryInner {
    requests: HashMap<String, TripRequest>,
    messages: Vec<(String, String)>,
    commits: Vec<(String, TripRequest)>,
}

/// Storage that keeps everything in memory and records every call
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a previously committed request
    pub fn with_request(self, session_id: &str, request: TripRequest) -> Self {
        self.inner
            .lock()
            .unwrap()
            .requests
            .insert(session_id.to_string(), request);
        self
    }

    /// Messages said to a session, in order
    pub fn messages(&self, session_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|(id, _)| id == session_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Number of commits recorded for a session
    pub fn commit_count(&self, session_id: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .commits
            .iter()
            .filter(|(id, _)| id == session_id)
            .count()
    }

    /// Last committed request for a session
    pub fn committed(&self, session_id: &str) -> Option<TripRequest> {
        self.inner.lock().unwrap().requests.get(session_id).cloned()
    }
}

#[async_trait]
impl MessageSink for MemoryStorage {
    async fn say(&self, session_id: &str, text: &str) -> Result<(), String> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .push((session_id.to_string(), text.to_string()));
        Ok(())
    }
}

#[async_trait]
impl StateStore for MemoryStorage {
    async fn commit(&self, session_id: &str, request: &TripRequest) -> Result<(), String> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .commits
            .push((session_id.to_string(), request.clone()));
        inner
            .requests
            .insert(session_id.to_string(), request.clone());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<TripRequest>, String> {
        Ok(self.inner.lock().unwrap().requests.get(session_id).cloned())
    }
}

// ============================================================================
// Failing Storage (for error path testing)
// ============================================================================

/// Storage whose say and/or commit calls fail
#[derive(Clone)]
pub struct FailingStorage {
    pub fail_say: bool,
    pub fail_commit: bool,
}

impl FailingStorage {
    pub fn commits() -> Self {
        Self {
            fail_say: false,
            fail_commit: true,
        }
    }

    pub fn says() -> Self {
        Self {
            fail_say: true,
            fail_commit: false,
        }
    }
}

#[async_trait]
impl MessageSink for FailingStorage {
    async fn say(&self, _session_id: &str, _text: &str) -> Result<(), String> {
        if self.fail_say {
            Err("sink unavailable".to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StateStore for FailingStorage {
    async fn commit(&self, _session_id: &str, _request: &TripRequest) -> Result<(), String> {
        if self.fail_commit {
            Err("disk full".to_string())
        } else {
            Ok(())
        }
    }

    async fn load(&self, _session_id: &str) -> Result<Option<TripRequest>, String> {
        Ok(None)
    }
}
