//! In-process session registry.
//!
//! The map lock is only held for lookups and inserts, never across an await. Each
//! session sits behind its own async mutex so turns within one session run one at a time.
//! `RwLock::unwrap()` is intentional: poisoning means another thread already panicked.
//!
//! Sessions idle for longer than the configured timeout are discarded, either when a new
//! session is created or by the periodic sweep started from `main`. A session with a turn
//! in flight is never discarded.

use chrono::{DateTime, Utc};
use finrag_core::error::{FinragError, Result};
use finrag_retrieval::ChatSession;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::DEFAULT_SESSION_IDLE_SECS;

pub struct SessionEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub session: ChatSession,
}

pub type SessionHandle = Arc<Mutex<SessionEntry>>;

struct Slot {
    handle: SessionHandle,
    last_used: Instant,
}

impl Slot {
    /// Another holder of the handle means a turn or view is in progress
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.handle) > 1
    }

    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        !self.in_use() && now.saturating_duration_since(self.last_used) >= timeout
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Slot>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_IDLE_SECS))
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self { sessions: RwLock::default(), idle_timeout }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Start a session with an empty transcript
    pub fn create(&self) -> (Uuid, DateTime<Utc>) {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let entry = SessionEntry { id, created_at, session: ChatSession::new() };

        let mut sessions = self.sessions.write().unwrap();
        let evicted = evict_idle(&mut sessions, Instant::now(), self.idle_timeout);
        sessions.insert(
            id,
            Slot { handle: Arc::new(Mutex::new(entry)), last_used: Instant::now() },
        );
        drop(sessions);

        tracing::info!(session_id = %id, evicted, "Session started");

        (id, created_at)
    }

    /// Look up a session and mark it as used
    pub fn get(&self, id: Uuid) -> Result<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().unwrap();

        let idle = match sessions.get(&id) {
            Some(slot) => slot.is_idle(now, self.idle_timeout),
            None => return Err(FinragError::SessionNotFound { id: id.to_string() }),
        };
        if idle {
            sessions.remove(&id);
            tracing::info!(session_id = %id, "Session expired");
            return Err(FinragError::SessionNotFound { id: id.to_string() });
        }

        let slot = sessions
            .get_mut(&id)
            .ok_or_else(|| FinragError::SessionNotFound { id: id.to_string() })?;
        slot.last_used = now;
        Ok(slot.handle.clone())
    }

    /// End a session; its transcript is discarded
    pub fn remove(&self, id: Uuid) -> Result<()> {
        match self.sessions.write().unwrap().remove(&id) {
            Some(_) => {
                tracing::info!(session_id = %id, "Session ended");
                Ok(())
            }
            None => Err(FinragError::SessionNotFound { id: id.to_string() }),
        }
    }

    /// Discard every idle session, returning how many were dropped
    pub fn evict_idle(&self) -> usize {
        let evicted =
            evict_idle(&mut self.sessions.write().unwrap(), Instant::now(), self.idle_timeout);
        if evicted > 0 {
            tracing::info!(evicted, "Discarded idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, Slot>, now: Instant, timeout: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, slot| !slot.is_idle(now, timeout));
    before - sessions.len()
}
