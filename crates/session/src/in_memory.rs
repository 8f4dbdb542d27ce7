//! In-memory session store — history lives for the process lifetime only.

use async_trait::async_trait;
use atomia_core::error::SessionError;
use atomia_core::message::{SessionId, Turn};
use atomia_core::session::{MAX_CONTEXT_MESSAGES, SessionStore, SessionSummary};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps every session's most recent turns in a map behind one lock.
///
/// Each trait operation takes the lock once, so append-then-trim can never
/// interleave with another writer.
pub struct InMemorySessionStore {
    capacity: usize,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, SessionEntry>,
    next_seq: u64,
}

struct SessionEntry {
    /// Creation order, used to list sessions first-seen first
    seq: u64,
    turns: Vec<Turn>,
}

impl Inner {
    fn entry(&mut self, session_id: &SessionId) -> &mut SessionEntry {
        let seq = self.next_seq;
        let created = !self.sessions.contains_key(session_id.as_str());
        if created {
            self.next_seq += 1;
            debug!(session_id = %session_id, "Session created");
        }
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                seq,
                turns: Vec::new(),
            })
    }
}

impl InMemorySessionStore {
    /// Create a store retaining at most `capacity` turns per session.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(MAX_CONTEXT_MESSAGES)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn ensure(&self, session_id: &SessionId) -> Result<(), SessionError> {
        self.inner.write().await.entry(session_id);
        Ok(())
    }

    async fn append(&self, session_id: &SessionId, turn: Turn) -> Result<Vec<Turn>, SessionError> {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(session_id);
        entry.turns.push(turn);

        let len = entry.turns.len();
        if len > self.capacity {
            entry.turns.drain(..len - self.capacity);
        }

        Ok(entry.turns.clone())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Vec<Turn>, SessionError> {
        self.inner
            .read()
            .await
            .sessions
            .get(session_id.as_str())
            .map(|e| e.turns.clone())
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    async fn reset(&self, session_id: &SessionId) -> Result<(), SessionError> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .sessions
            .get_mut(session_id.as_str())
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        entry.turns = Vec::new();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let inner = self.inner.read().await;

        let mut entries: Vec<(&String, &SessionEntry)> = inner.sessions.iter().collect();
        entries.sort_by_key(|(_, e)| e.seq);

        Ok(entries
            .into_iter()
            .map(|(id, e)| SessionSummary {
                session_id: id.clone(),
                message_count: e.turns.len(),
                last_activity: e.turns.last().map(|t| t.timestamp),
            })
            .collect())
    }

    async fn count(&self) -> Result<usize, SessionError> {
        Ok(self.inner.read().await.sessions.len())
    }
}
