//! In-memory user repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::user::{User, UserRepository};

#[derive(Default)]
struct Store {
    users: HashMap<i64, User>,
    emails: HashMap<String, i64>,
    last_id: i64,
}

/// Users kept in process memory.
#[derive(Default)]
pub struct MemoryUserRepository {
    store: RwLock<Store>,
}

impl MemoryUserRepository {
    /// Create a new empty [`MemoryUserRepository`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &mut User) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;

        if store.emails.contains_key(&user.email) {
            return Err(RepositoryError::UniqueViolation("users_email_key".into()));
        }

        store.last_id += 1;
        let now = Utc::now();
        user.id = store.last_id;
        user.created_at = now;
        user.updated_at = now;

        store.emails.insert(user.email.clone(), user.id);
        store.users.insert(user.id, user.clone());

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let store = self.store.read().await;

        store
            .emails
            .get(email)
            .and_then(|id| store.users.get(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        self.store
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}
