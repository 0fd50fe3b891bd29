//! Owner-scoped task operations over a [`TaskStore`].
//!
//! Every task operation takes the caller's [`Identity`] and uses its id as the
//! owner constraint, so a caller can only read, change or remove their own
//! tasks. Every store call is bounded by a deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Identity, NewUser, Task, TaskFilter, TaskInput, User};
use crate::store::{StoreError, TaskStore};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No task with this id is owned by the caller.
    #[error("task not found or not owned by caller")]
    NotFoundOrForbidden,
    /// Delete matched no task owned by the caller.
    #[error("nothing deleted")]
    NothingDeleted,
    /// No user with this email.
    #[error("user not found")]
    NotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn TaskStore>,
    timeout: Duration,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<dyn TaskStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("store call exceeded {:?}", self.timeout);
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    /// Stores a new task owned by `owner`.
    pub async fn create(
        &self,
        input: &TaskInput,
        owner: &Identity,
    ) -> Result<Task, RepositoryError> {
        let task = self.bounded(self.store.insert_task(input, owner)).await?;
        info!("task {} created by {}", task.id, owner.id);
        Ok(task)
    }

    /// Lists the tasks matching `filter`. The filter always carries the
    /// caller's owner id, see [`TaskFilter::from_query`].
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, RepositoryError> {
        let tasks = self.bounded(self.store.find_tasks(filter)).await?;
        debug!("listed {} tasks for {}", tasks.len(), filter.owner_id());
        Ok(tasks)
    }

    pub async fn get(&self, id: Uuid, owner: &Identity) -> Result<Task, RepositoryError> {
        let filter = TaskFilter::for_owner(owner.id).with_id(id);
        self.list(&filter)
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFoundOrForbidden)
    }

    /// Replaces every mutable field of the caller's task `id` and returns the
    /// stored record. The author name is refreshed from `owner`.
    pub async fn update(
        &self,
        id: Uuid,
        input: &TaskInput,
        owner: &Identity,
    ) -> Result<Task, RepositoryError> {
        match self.bounded(self.store.replace_task(id, input, owner)).await? {
            Some(task) => {
                info!("task {} updated by {}", id, owner.id);
                Ok(task)
            }
            None => {
                debug!("update of task {} by {} matched nothing", id, owner.id);
                Err(RepositoryError::NotFoundOrForbidden)
            }
        }
    }

    /// Deletes the caller's task `id`. A missing task and someone else's task
    /// both yield `NothingDeleted`.
    pub async fn delete(&self, id: Uuid, owner: &Identity) -> Result<(), RepositoryError> {
        let removed = self.bounded(self.store.delete_task(id, owner.id)).await?;
        if removed == 0 {
            debug!("delete of task {} by {} matched nothing", id, owner.id);
            return Err(RepositoryError::NothingDeleted);
        }
        info!("task {} deleted by {}", id, owner.id);
        Ok(())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.bounded(self.store.find_user_by_email(email))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    pub async fn register_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let user = self
            .bounded(self.store.insert_user(user))
            .await?
            .ok_or(RepositoryError::EmailTaken)?;
        info!("registered user {}", user.id);
        Ok(user)
    }
}
