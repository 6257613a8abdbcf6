use dashmap::DashMap;
use shared::UserId;

use super::{Session, SessionStore};

/// Process-wide session map
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<UserId, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, user_id: UserId) -> Option<Session> {
        self.sessions.get(&user_id).map(|entry| entry.value().clone())
    }

    fn set(&self, user_id: UserId, session: Session) {
        self.sessions.insert(user_id, session);
    }

    fn delete(&self, user_id: UserId) {
        self.sessions.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CustomerStep, DialogueState};

    fn busy() -> Session {
        Session {
            state: DialogueState::Customer(CustomerStep::AwaitingName),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_get_delete() {
        let store = MemorySessionStore::new();
        store.set(1, busy());
        assert_eq!(store.get(1), Some(busy()));

        store.delete(1);
        assert_eq!(store.get(1), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_drops_vacant_sessions() {
        let store = MemorySessionStore::new();
        store.put(1, busy());
        assert_eq!(store.len(), 1);

        store.put(1, Session::default());
        assert!(store.is_empty());
        assert_eq!(store.load(1), Session::default());
    }
}
