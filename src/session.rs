//! Per-user session storage
//!
//! Holds at most one [`Session`] per user and hands out per-user locks so an
//! inbound message and a button press for the same user never interleave
//! their read-decide-write cycles. Different users never contend with each
//! other beyond the brief map accesses.

use crate::types::{Session, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-memory store mapping each user to their active session
///
/// All operations are async and take `&self`; the store is shared via `Arc`.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the per-user interaction lock
    ///
    /// Callers hold the returned guard across their read-decide-write cycle
    /// so concurrent events from the same user serialize. The guard must not
    /// be held across slow collaborator calls.
    pub async fn lock_user(&self, user: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.user_locks.lock().await;
            Arc::clone(locks.entry(user).or_default())
        };
        lock.lock_owned().await
    }

    /// Get a snapshot of the user's active session, if any
    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.sessions.lock().await.get(&user).cloned()
    }

    /// Store a session for its owner, replacing any existing one
    pub async fn put(&self, session: Session) {
        self.sessions.lock().await.insert(session.owner, session);
    }

    /// Remove the user's session; a no-op when none exists
    ///
    /// Also drops the user's lock entry when nobody holds or awaits it, so
    /// the lock map does not grow with every user ever seen.
    pub async fn clear(&self, user: UserId) {
        self.sessions.lock().await.remove(&user);
        let mut locks = self.user_locks.lock().await;
        if locks
            .get(&user)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&user);
        }
    }

    /// Number of active sessions
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no sessions are active
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Advance the user's session to the next page
    ///
    /// Returns the new page index, or `None` when there is no session or the
    /// move would land past the last page (the session is left unchanged).
    pub async fn advance_page(&self, user: UserId, page_size: usize) -> Option<usize> {
        if page_size == 0 {
            return None;
        }
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&user)?;
        let next_start = (session.page_index + 1) * page_size;
        if next_start >= session.result_set.len() {
            return None;
        }
        session.page_index += 1;
        Some(session.page_index)
    }

    /// Move the user's session back one page
    ///
    /// Returns the new page index, or `None` when there is no session or the
    /// session is already on page 0.
    pub async fn retreat_page(&self, user: UserId) -> Option<usize> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&user)?;
        if session.page_index == 0 {
            return None;
        }
        session.page_index -= 1;
        Some(session.page_index)
    }
}
