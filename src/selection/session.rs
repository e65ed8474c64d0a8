//! Per-browser-session selection state, keyed by a random session id.
//!
//! The store is bounded: sessions idle longer than the configured timeout are
//! dropped whenever a new one opens, and past the capacity the least recently
//! used session is evicted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;

use crate::selection::SelectionState;

pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: SelectionState,
    last_seen: Instant,
    // Monotonic recency, breaks ties between equal `Instant`s.
    touched: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<Uuid, Entry>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn touch(&mut self, id: &Uuid) -> Option<&mut Entry> {
        let touched = self.tick();
        let entry = self.entries.get_mut(id)?;
        entry.last_seen = Instant::now();
        entry.touched = touched;
        Some(entry)
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max_sessions` is clamped to at least one.
    pub fn with_limits(max_sessions: usize, idle_timeout: Duration) -> Self {
        SessionStore {
            sessions: Mutex::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        // Entries are Copy and written whole, a poisoned lock leaves no torn state.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a new session in `Idle`, making room first.
    pub fn create(&self) -> Uuid {
        let mut sessions = self.sessions();
        let now = Instant::now();

        let before = sessions.entries.len();
        let idle_timeout = self.idle_timeout;
        sessions
            .entries
            .retain(|_, entry| now.duration_since(entry.last_seen) < idle_timeout);
        let expired = before - sessions.entries.len();

        let mut evicted = 0;
        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.entries.remove(&id);
                    evicted += 1;
                }
                None => break,
            }
        }
        if expired + evicted > 0 {
            debug!(expired, evicted, "pruned sessions");
        }

        let id = Uuid::new_v4();
        let touched = sessions.tick();
        sessions.entries.insert(
            id,
            Entry {
                state: SelectionState::Idle,
                last_seen: now,
                touched,
            },
        );
        id
    }

    /// Current state; counts as activity for the session.
    pub fn state(&self, id: &Uuid) -> Option<SelectionState> {
        self.sessions().touch(id).map(|entry| entry.state)
    }

    /// Apply a click. Returns the new state, or `None` for an unknown session.
    pub fn click(&self, id: &Uuid, position: usize) -> Option<SelectionState> {
        let mut sessions = self.sessions();
        let entry = sessions.touch(id)?;
        entry.state = entry.state.on_click(position);
        Some(entry.state)
    }

    pub fn len(&self) -> usize {
        self.sessions().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn click_moves_session_to_selected() {
        let store = SessionStore::new();
        let id = store.create();
        assert_eq!(store.state(&id), Some(SelectionState::Idle));
        assert_eq!(store.click(&id, 2), Some(SelectionState::Selected(2)));
        assert_eq!(store.click(&id, 5), Some(SelectionState::Selected(5)));
        assert_eq!(store.state(&id), Some(SelectionState::Selected(5)));
    }

    #[test]
    fn unknown_session_is_rejected() {
        let store = SessionStore::new();
        assert_eq!(store.click(&Uuid::new_v4(), 0), None);
        assert!(store.is_empty());
    }

    #[test]
    fn least_recently_used_session_is_evicted_at_capacity() {
        let store = SessionStore::with_limits(2, HOUR);
        let first = store.create();
        let second = store.create();
        // Using `first` makes `second` the oldest.
        store.click(&first, 1);
        let third = store.create();

        assert_eq!(store.len(), 2);
        assert_eq!(store.state(&second), None);
        assert_eq!(store.state(&first), Some(SelectionState::Selected(1)));
        assert_eq!(store.state(&third), Some(SelectionState::Idle));
    }

    #[test]
    fn idle_sessions_expire_when_a_new_one_opens() {
        let store = SessionStore::with_limits(16, Duration::ZERO);
        let stale = store.create();
        let fresh = store.create();
        assert_eq!(store.len(), 1);
        assert_eq!(store.state(&stale), None);
        assert_eq!(store.state(&fresh), Some(SelectionState::Idle));
    }

    #[test]
    fn zero_capacity_still_holds_one_session() {
        let store = SessionStore::with_limits(0, HOUR);
        let id = store.create();
        assert_eq!(store.state(&id), Some(SelectionState::Idle));
    }
}
