use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::{SessionData, SessionStore};

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TIMEOUT_HOURS: i64 = 24;
/// Upper bound on live sessions; the least recently used one makes room.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct Entry {
    data: SessionData,
    last_seen: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

impl Inner {
    fn touch(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn sweep(&mut self, now: DateTime<Utc>, idle_timeout: Duration) {
        self.entries
            .retain(|_, entry| now - entry.last_seen < idle_timeout);
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.seq)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.entries.remove(&id);
        }
    }
}

/// Process-local session store. Sessions are lost on restart.
#[derive(Debug)]
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_limits(
            Duration::hours(DEFAULT_IDLE_TIMEOUT_HOURS),
            DEFAULT_MAX_SESSIONS,
        )
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that forgets sessions idle for `idle_timeout` and keeps at most
    /// `max_sessions` of them (never fewer than one).
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> Option<SessionData> {
        let now = Utc::now();
        let mut inner = self.inner.lock().await;
        let stale = now - inner.entries.get(id)?.last_seen >= self.idle_timeout;
        if stale {
            inner.entries.remove(id);
            return None;
        }
        let seq = inner.touch();
        let entry = inner.entries.get_mut(id)?;
        entry.last_seen = now;
        entry.seq = seq;
        Some(entry.data.clone())
    }

    async fn set(&self, id: &str, data: SessionData) {
        let now = Utc::now();
        let mut inner = self.inner.lock().await;
        inner.sweep(now, self.idle_timeout);
        if !inner.entries.contains_key(id) && inner.entries.len() >= self.max_sessions {
            inner.evict_oldest();
        }
        let seq = inner.touch();
        inner.entries.insert(
            id.to_string(),
            Entry {
                data,
                last_seen: now,
                seq,
            },
        );
    }

    async fn clear(&self, id: &str) {
        self.inner.lock().await.entries.remove(id);
    }
}
