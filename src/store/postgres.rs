use std::time::Duration;

use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{StoreError, TaskStore};
use crate::models::{Identity, NewUser, Task, TaskFilter, TaskInput, User};

const TASK_COLUMNS: &str = "id, title, description, tag, duration, date, author, author_id";
const USER_COLUMNS: &str = "id, name, email, password_hash";

/// Postgres-backed store over the `tasks` and `users` tables (see `schema.sql`).
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool whose connection acquisition is bounded by `timeout`.
    pub async fn connect(database_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await?;
        info!("connected to postgres");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escapes LIKE metacharacters and wraps the term for a substring match.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Builds the SELECT for a filter: one bound predicate per present field,
/// joined with AND, always starting with the owner.
fn select_tasks(filter: &TaskFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM tasks WHERE author_id = ",
        TASK_COLUMNS
    ));
    qb.push_bind(filter.owner_id());

    if let Some(id) = filter.id {
        qb.push(" AND id = ").push_bind(id);
    }
    if let Some(title) = &filter.title {
        qb.push(" AND title ILIKE ").push_bind(like_pattern(title));
    }
    if let Some(description) = &filter.description {
        qb.push(" AND description ILIKE ").push_bind(like_pattern(description));
    }
    if let Some(min) = filter.duration_min {
        qb.push(" AND duration >= ").push_bind(min);
    }
    if let Some(max) = filter.duration_max {
        qb.push(" AND duration <= ").push_bind(max);
    }
    if let Some(tag) = &filter.tag {
        qb.push(" AND tag = ").push_bind(tag.clone());
    }
    if let Some(author) = &filter.author {
        qb.push(" AND author = ").push_bind(author.clone());
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND date <= ").push_bind(to);
    }

    qb.push(" ORDER BY date DESC, id");
    qb
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert_task(&self, input: &TaskInput, owner: &Identity) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, tag, duration, date, author, author_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.tag)
            .bind(input.duration)
            .bind(input.date)
            .bind(&owner.name)
            .bind(owner.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let mut qb = select_tasks(filter);
        let tasks = qb.build_query_as::<Task>().fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn replace_task(
        &self,
        id: Uuid,
        input: &TaskInput,
        owner: &Identity,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tasks \
             SET title = $1, description = $2, tag = $3, duration = $4, date = $5, author = $6 \
             WHERE id = $7 AND author_id = $8 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.tag)
            .bind(input.duration)
            .bind(input.date)
            .bind(&owner.name)
            .bind(id)
            .bind(owner.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid, owner_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {}",
            USER_COLUMNS
        );
        let inserted = sqlx::query_as::<_, User>(&sql)
            .bind(user.name)
            .bind(user.email)
            .bind(user.password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(inserted)
    }
}
