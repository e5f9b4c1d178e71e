//! Session registry
//!
//! 接続中のセッションの集合を管理します。
//! 全ての操作は単一の `Mutex` の内側で行われるため、
//! 訪問中のセッションが削除されたり、削除中のセッションが訪問されたりすることはありません。
//! `close` 以降は新しいセッションを受け付けません。

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::{error::RegistryError, session::SessionOutbox, value_object::SessionId};

/// What to do with a session after visiting it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Keep,
    Remove,
}

#[derive(Debug, Default)]
struct Sessions {
    /// Key: session id, Value: the dispatcher-facing end of its buffer
    by_id: HashMap<SessionId, SessionOutbox>,
    closed: bool,
}

/// The set of currently connected sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for live delivery
    pub async fn add(
        &self,
        session_id: SessionId,
        outbox: SessionOutbox,
    ) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.closed {
            return Err(RegistryError::Closed);
        }
        if sessions.by_id.contains_key(&session_id) {
            return Err(RegistryError::AlreadyRegistered);
        }
        sessions.by_id.insert(session_id, outbox);
        tracing::debug!("Session '{}' registered", session_id);
        Ok(())
    }

    /// Remove a session, closing its outbox
    ///
    /// Returns `false` if it was not registered; removing twice is a no-op.
    pub async fn remove(&self, session_id: &SessionId) -> bool {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.by_id.remove(session_id).is_some();
        if removed {
            tracing::debug!("Session '{}' unregistered", session_id);
        }
        removed
    }

    /// Visit every session while holding the registry lock
    ///
    /// Sessions for which `visit` returns [`Visit::Remove`] are dropped in the
    /// same critical section. Returns how many were removed.
    pub async fn for_each<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&SessionId, &SessionOutbox) -> Visit,
    {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.by_id.len();
        sessions
            .by_id
            .retain(|session_id, outbox| visit(session_id, outbox) == Visit::Keep);
        before - sessions.by_id.len()
    }

    /// Stop accepting sessions and release every registered one
    ///
    /// Returns how many were released. Later calls to `add` fail with
    /// [`RegistryError::Closed`].
    pub async fn close(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        sessions.closed = true;
        let count = sessions.by_id.len();
        sessions.by_id.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.by_id.is_empty()
    }

    pub async fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.lock().await.by_id.contains_key(session_id)
    }
}
