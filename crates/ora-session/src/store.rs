//! Keyed, TTL-expiring container of mutable workflow state.
//!
//! Expiry is enforced lazily on every read and write rather than by a
//! background sweep; a session can therefore die silently between writes.
//! `cleanup_expired` exists for periodic invocation but is not required for
//! correctness.
//!
//! Concurrency: `DashMap` keeps individual entries internally consistent,
//! but the store does not arbitrate between concurrent writers to the same
//! session id. Callers are expected to serialize their own writes per
//! session.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ora_domain::{ResearchError, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One entry in a session's append-only execution log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Agent or operation name
    pub agent: String,
    /// When the operation ran
    pub at: DateTime<Utc>,
    /// Whether it succeeded
    pub success: bool,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Failure message, if any
    pub error: Option<String>,
    /// Tokens consumed, if the operation tracked them
    pub tokens_used: Option<u64>,
}

impl ExecutionRecord {
    /// Create a successful record
    #[inline]
    #[must_use]
    pub fn success(agent: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            agent: agent.into(),
            at: Utc::now(),
            success: true,
            duration_ms,
            error: None,
            tokens_used: None,
        }
    }

    /// Create a failed record
    #[inline]
    #[must_use]
    pub fn failure(agent: impl Into<String>, duration_ms: u64, error: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            at: Utc::now(),
            success: false,
            duration_ms,
            error: Some(error.into()),
            tokens_used: None,
        }
    }

    /// With token usage
    #[inline]
    #[must_use]
    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens_used = Some(tokens);
        self
    }
}

/// Mutable per-session state plus its execution history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Session identifier
    pub id: SessionId,
    /// Owning user id
    pub owner: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last read/write touch; drives expiry
    pub last_activity: DateTime<Utc>,
    /// Whether the session accepts writes
    pub active: bool,
    /// Caller-defined state payload (shallow-merged on update)
    pub payload: serde_json::Map<String, Value>,
    /// Append-only execution log
    pub history: Vec<ExecutionRecord>,
    /// Running token counter across all recorded executions
    pub total_tokens: u64,
}

/// In-process session store with lazy TTL expiry.
///
/// Process-lifetime state with no external durability; inject it as a
/// dependency into anything that needs sessions.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionState>,
    timeout: Duration,
}

impl SessionStore {
    /// Create a store with the given session timeout
    #[inline]
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            timeout,
        }
    }

    /// Allocate a fresh session. Always succeeds.
    ///
    /// A JSON-object seed is merged into the payload; any other seed value
    /// is stored under the `"input"` key.
    pub fn create_session(&self, owner: impl Into<String>, seed: Value) -> SessionId {
        let id = SessionId::new();
        let now = Utc::now();
        let mut payload = serde_json::Map::new();
        match seed {
            Value::Object(map) => payload.extend(map),
            Value::Null => {}
            other => {
                payload.insert("input".to_string(), other);
            }
        }

        let state = SessionState {
            id,
            owner: owner.into(),
            created_at: now,
            last_activity: now,
            active: true,
            payload,
            history: Vec::new(),
            total_tokens: 0,
        };
        self.sessions.insert(id, state);
        tracing::debug!(session = %id, "session created");
        id
    }

    /// Fetch a session, enforcing expiry at read time.
    ///
    /// # Errors
    /// `ResearchError::SessionNotFound` for unknown or expired ids; the
    /// expired entry is deleted before returning.
    pub fn get_session(&self, id: SessionId) -> Result<SessionState, ResearchError> {
        let expired = match self.sessions.get(&id) {
            None => return Err(ResearchError::SessionNotFound(id)),
            Some(entry) => self.is_expired(&entry),
        };

        if expired {
            self.sessions.remove(&id);
            tracing::debug!(session = %id, "session expired on read");
            return Err(ResearchError::SessionNotFound(id));
        }

        // Unwrap is safe only against concurrent removal; re-check instead.
        self.sessions
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(ResearchError::SessionNotFound(id))
    }

    /// Shallow-merge fields into the payload and bump `last_activity`.
    ///
    /// # Errors
    /// `SessionNotFound` for unknown, expired, or closed sessions;
    /// `Validation` when the partial update is not a JSON object.
    pub fn update_state(&self, id: SessionId, partial: Value) -> Result<(), ResearchError> {
        let Value::Object(fields) = partial else {
            return Err(ResearchError::Validation(
                "partial session update must be a JSON object".to_string(),
            ));
        };
        self.with_writable(id, |state| {
            state.payload.extend(fields);
        })
    }

    /// Append to the execution log, folding token usage into the running
    /// counter, and bump `last_activity`.
    ///
    /// # Errors
    /// `SessionNotFound` for unknown, expired, or closed sessions.
    pub fn append_execution(
        &self,
        id: SessionId,
        record: ExecutionRecord,
    ) -> Result<(), ResearchError> {
        self.with_writable(id, |state| {
            if let Some(tokens) = record.tokens_used {
                state.total_tokens += tokens;
            }
            state.history.push(record);
        })
    }

    /// Mark a session inactive. Subsequent writes are rejected; reads keep
    /// working until the entry expires.
    ///
    /// # Errors
    /// `SessionNotFound` for unknown or expired ids.
    pub fn close_session(&self, id: SessionId) -> Result<(), ResearchError> {
        match self.sessions.get_mut(&id) {
            None => Err(ResearchError::SessionNotFound(id)),
            Some(mut entry) => {
                if self.is_expired(&entry) {
                    drop(entry);
                    self.sessions.remove(&id);
                    return Err(ResearchError::SessionNotFound(id));
                }
                entry.active = false;
                entry.last_activity = Utc::now();
                tracing::debug!(session = %id, "session closed");
                Ok(())
            }
        }
    }

    /// Remove every expired entry. Idempotent; a second call removes zero.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.sessions.len();
        let timeout = self.timeout;
        self.sessions
            .retain(|_, state| !elapsed_exceeds(state.last_activity, timeout));
        let removed = before - self.sessions.len();
        if removed > 0 {
            tracing::info!(removed, "expired sessions cleaned up");
        }
        removed
    }

    /// Number of live entries (expired-but-unread entries included)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, state: &SessionState) -> bool {
        elapsed_exceeds(state.last_activity, self.timeout)
    }

    fn with_writable<F>(&self, id: SessionId, apply: F) -> Result<(), ResearchError>
    where
        F: FnOnce(&mut SessionState),
    {
        match self.sessions.get_mut(&id) {
            None => Err(ResearchError::SessionNotFound(id)),
            Some(mut entry) => {
                if self.is_expired(&entry) {
                    drop(entry);
                    self.sessions.remove(&id);
                    tracing::debug!(session = %id, "session expired on write");
                    return Err(ResearchError::SessionNotFound(id));
                }
                if !entry.active {
                    return Err(ResearchError::SessionNotFound(id));
                }
                apply(&mut entry);
                entry.last_activity = Utc::now();
                Ok(())
            }
        }
    }
}

fn elapsed_exceeds(last_activity: DateTime<Utc>, timeout: Duration) -> bool {
    (Utc::now() - last_activity)
        .to_std()
        .map(|elapsed| elapsed > timeout)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const LONG: Duration = Duration::from_secs(3600);
    const SHORT: Duration = Duration::from_millis(10);

    #[test]
    fn create_and_get_roundtrip() {
        let store = SessionStore::new(LONG);
        let id = store.create_session("user-1", json!({ "topic": "robotics" }));

        let state = store.get_session(id).unwrap();
        assert_eq!(state.owner, "user-1");
        assert_eq!(state.payload["topic"], json!("robotics"));
        assert!(state.active);
        assert!(state.history.is_empty());
    }

    #[test]
    fn non_object_seed_lands_under_input() {
        let store = SessionStore::new(LONG);
        let id = store.create_session("user-1", json!("free text"));
        let state = store.get_session(id).unwrap();
        assert_eq!(state.payload["input"], json!("free text"));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = SessionStore::new(LONG);
        let err = store.get_session(SessionId::new()).unwrap_err();
        assert!(matches!(err, ResearchError::SessionNotFound(_)));
    }

    #[test]
    fn update_merges_fields_and_bumps_activity() {
        let store = SessionStore::new(LONG);
        let id = store.create_session("user-1", json!({ "a": 1 }));
        let before = store.get_session(id).unwrap().last_activity;

        store.update_state(id, json!({ "b": 2 })).unwrap();
        let state = store.get_session(id).unwrap();
        assert_eq!(state.payload["a"], json!(1));
        assert_eq!(state.payload["b"], json!(2));
        assert!(state.last_activity >= before);
    }

    #[test]
    fn update_rejects_non_object() {
        let store = SessionStore::new(LONG);
        let id = store.create_session("user-1", Value::Null);
        let err = store.update_state(id, json!([1, 2])).unwrap_err();
        assert!(matches!(err, ResearchError::Validation(_)));
    }

    #[test]
    fn append_execution_accumulates_tokens() {
        let store = SessionStore::new(LONG);
        let id = store.create_session("user-1", Value::Null);

        store
            .append_execution(id, ExecutionRecord::success("planner", 120).with_tokens(500))
            .unwrap();
        store
            .append_execution(
                id,
                ExecutionRecord::failure("investigator", 80, "timeout").with_tokens(250),
            )
            .unwrap();

        let state = store.get_session(id).unwrap();
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.total_tokens, 750);
        assert!(!state.history[1].success);
    }

    #[test]
    fn expired_session_dies_on_read() {
        let store = SessionStore::new(SHORT);
        let id = store.create_session("user-1", Value::Null);
        std::thread::sleep(Duration::from_millis(30));

        let err = store.get_session(id).unwrap_err();
        assert!(matches!(err, ResearchError::SessionNotFound(_)));
        // Entry was deleted, not just hidden.
        assert!(store.is_empty());
    }

    #[test]
    fn expired_session_dies_on_write() {
        let store = SessionStore::new(SHORT);
        let id = store.create_session("user-1", Value::Null);
        std::thread::sleep(Duration::from_millis(30));

        let err = store.update_state(id, json!({ "x": 1 })).unwrap_err();
        assert!(matches!(err, ResearchError::SessionNotFound(_)));
    }

    #[test]
    fn cleanup_removes_exactly_expired_and_is_idempotent() {
        let store = SessionStore::new(SHORT);
        let stale = store.create_session("user-1", Value::Null);
        std::thread::sleep(Duration::from_millis(30));
        let fresh = store.create_session("user-2", Value::Null);

        assert_eq!(store.cleanup_expired(), 1);
        assert!(store.get_session(stale).is_err());
        assert!(store.get_session(fresh).is_ok());
        assert_eq!(store.cleanup_expired(), 0);
    }

    #[test]
    fn closed_session_rejects_writes_but_allows_reads() {
        let store = SessionStore::new(LONG);
        let id = store.create_session("user-1", Value::Null);
        store.close_session(id).unwrap();

        let state = store.get_session(id).unwrap();
        assert!(!state.active);

        let err = store.update_state(id, json!({ "x": 1 })).unwrap_err();
        assert!(matches!(err, ResearchError::SessionNotFound(_)));
    }
}
