use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskStore};
use crate::models::{Identity, NewUser, Task, TaskFilter, TaskInput, User};

/// In-process store evaluating filters with [`TaskFilter::matches`].
///
/// Used by the test suites and for running the service without Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<Task>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, input: &TaskInput, owner: &Identity) -> Result<Task, StoreError> {
        let task = Task {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            tag: input.tag.clone(),
            duration: input.duration,
            date: input.date,
            author: owner.name.clone(),
            author_id: owner.id,
        };
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let mut found: Vec<Task> = self
            .tasks
            .read()
            .await
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn replace_task(
        &self,
        id: Uuid,
        input: &TaskInput,
        owner: &Identity,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks
            .iter_mut()
            .find(|t| t.id == id && t.author_id == owner.id)
        else {
            return Ok(None);
        };
        task.title = input.title.clone();
        task.description = input.description.clone();
        task.tag = input.tag.clone();
        task.duration = input.duration;
        task.date = input.date;
        task.author = owner.name.clone();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.author_id == owner_id));
        Ok((before - tasks.len()) as u64)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let stored = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        users.push(stored.clone());
        Ok(Some(stored))
    }
}
