//! User store boundary.
//!
//! The relational user store is an external collaborator; the handshake core
//! consumes it only through this trait. The in-memory implementation backs
//! local runs and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error>;
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.lock().insert(user.id, user);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, User>> {
        // A poisoned map is still a valid map of users.
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let users = self.lock();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let users = self.lock();
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryUserStore::new();
        let user = User::new("a@b.com".into(), None, "hash".into());
        let id = user.id;
        store.insert(user);

        assert!(store.find_by_email("a@b.com").await.unwrap().is_some());
        assert!(store.find_by_email("x@y.com").await.unwrap().is_none());
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().id, id);
    }
}
