//! Persistence backends.
//!
//! [`TaskStore`] is the generic CRUD+query seam the repository talks to.
//! Ownership rules are not enforced here beyond honouring the owner id that is
//! passed in; see [`crate::repository::TaskRepository`].

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Identity, NewUser, Task, TaskFilter, TaskInput, User};

pub use memory::MemoryStore;
pub use postgres::PgTaskStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store call exceeded {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task owned by `owner`; the store assigns the id.
    async fn insert_task(&self, input: &TaskInput, owner: &Identity) -> Result<Task, StoreError>;

    /// Returns every task matching `filter`, newest `date` first.
    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Replaces the mutable fields of the task matching both `id` and
    /// `owner.id`. Returns `None` when no such task exists.
    async fn replace_task(
        &self,
        id: Uuid,
        input: &TaskInput,
        owner: &Identity,
    ) -> Result<Option<Task>, StoreError>;

    /// Deletes the task matching both `id` and `owner_id`; returns the number
    /// of removed records.
    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<u64, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a user. Returns `None` if the email is already registered.
    async fn insert_user(&self, user: NewUser) -> Result<Option<User>, StoreError>;
}
