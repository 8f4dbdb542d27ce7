//! Session store trait — per-session bounded turn history.
//!
//! A session is an ordered sequence of [`Turn`]s capped at a fixed length.
//! Appending past the cap silently discards the oldest turns. Sessions are
//! created on first reference and live until the process exits.

use crate::error::SessionError;
use crate::message::{SessionId, Turn};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of turns retained per session.
pub const MAX_CONTEXT_MESSAGES: usize = 15;

/// Listing entry for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub message_count: usize,
    /// Timestamp of the most recent turn, `None` for an empty session
    pub last_activity: Option<DateTime<Utc>>,
}

/// The core SessionStore trait.
///
/// Every operation is atomic with respect to other callers of the same store.
/// Implementations: in-memory (the only one Atomia ships).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Create an empty session if none exists. Idempotent.
    async fn ensure(&self, session_id: &SessionId) -> std::result::Result<(), SessionError>;

    /// Append a turn (creating the session if needed), trim to capacity,
    /// and return the retained turns.
    async fn append(
        &self,
        session_id: &SessionId,
        turn: Turn,
    ) -> std::result::Result<Vec<Turn>, SessionError>;

    /// Current turns of a session, oldest first.
    async fn get(&self, session_id: &SessionId) -> std::result::Result<Vec<Turn>, SessionError>;

    /// Empty a session's history. The session itself stays known.
    async fn reset(&self, session_id: &SessionId) -> std::result::Result<(), SessionError>;

    /// Summaries of every known session, in creation order.
    async fn list(&self) -> std::result::Result<Vec<SessionSummary>, SessionError>;

    /// Number of known sessions.
    async fn count(&self) -> std::result::Result<usize, SessionError>;
}
