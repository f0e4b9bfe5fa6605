//! Accounts owning portal pages.

mod memory;
mod repository;
mod usecase;

pub use memory::*;
pub use repository::*;
pub use usecase::*;

use chrono::{DateTime, Utc};

/// User as saved on database.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2id PHC string.
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user not persisted yet.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();

        Self {
            id: 0,
            name,
            email,
            password: password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
