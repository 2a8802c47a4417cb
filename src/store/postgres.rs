use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{Identity, NewUser, Role, Task, User};

const TASK_COLUMNS: &str = "id, title, description, due_date, status, priority, completed, user_id, created_at, updated_at";
const IDENTITY_COLUMNS: &str = "id, username, email, role, is_verified, created_at";

/// Postgres-backed store for users and tasks.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique violations (SQLSTATE 23505) to [`StoreError::Conflict`].
fn map_sqlx(error: sqlx::Error, conflict: &str) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(conflict.to_string())
        }
        _ => StoreError::Backend(error.to_string()),
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        map_sqlx(error, "unique constraint violated")
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, role, is_verified)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, username, email, password_hash, role, is_verified, created_at",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_verified)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx(e, "Email already registered"))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, role, is_verified, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_identity(&self, id: i32) -> StoreResult<Option<Identity>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", IDENTITY_COLUMNS);
        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(identity)
    }

    async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", IDENTITY_COLUMNS);
        let identities = sqlx::query_as::<_, Identity>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(identities)
    }

    async fn set_role(&self, id: i32, role: Role) -> StoreResult<Option<Identity>> {
        let sql = format!(
            "UPDATE users SET role = $1 WHERE id = $2 RETURNING {}",
            IDENTITY_COLUMNS
        );
        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(role)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(identity)
    }

    async fn set_verified(&self, id: i32, verified: bool) -> StoreResult<Option<Identity>> {
        let sql = format!(
            "UPDATE users SET is_verified = $1 WHERE id = $2 RETURNING {}",
            IDENTITY_COLUMNS
        );
        let identity = sqlx::query_as::<_, Identity>(&sql)
            .bind(verified)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(identity)
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> StoreResult<Task> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, due_date, status, priority, completed, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.completed)
            .bind(task.user_id)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx(e, "A task with this title already exists"))
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn find_task_by_title(&self, title: &str) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {} FROM tasks WHERE title = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_tasks_by_owner(&self, owner_id: i32) -> StoreResult<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let sql = format!(
            "UPDATE tasks
             SET title = $1, description = $2, due_date = $3, status = $4, priority = $5,
                 completed = $6, updated_at = $7
             WHERE id = $8
             RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.completed)
            .bind(task.updated_at)
            .bind(task.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx(e, "A task with this title already exists"))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_tasks_by_owner(&self, owner_id: i32) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
