//! Persistence seams.
//!
//! Handlers and services talk to storage only through [`UserStore`] and
//! [`TaskStore`]. [`PgStore`] is the production backend; [`MemoryStore`] keeps
//! everything in process and backs the integration tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Identity, NewUser, Role, Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// What a store reports to the layers above it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with [`StoreError::Conflict`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Loads the full row including the password hash.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Loads the identity projection, without the password hash.
    async fn find_identity(&self, id: i32) -> StoreResult<Option<Identity>>;

    async fn list_identities(&self) -> StoreResult<Vec<Identity>>;

    async fn set_role(&self, id: i32, role: Role) -> StoreResult<Option<Identity>>;

    /// Sets the email-verification flag. `None` if the user does not exist.
    async fn set_verified(&self, id: i32, verified: bool) -> StoreResult<Option<Identity>>;

    /// Removes the user row only; tasks owned by the user are left in place.
    async fn delete_user(&self, id: i32) -> StoreResult<bool>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task. Fails with [`StoreError::Conflict`] if the title is taken.
    async fn insert_task(&self, task: &Task) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    async fn find_task_by_title(&self, title: &str) -> StoreResult<Option<Task>>;

    async fn list_tasks_by_owner(&self, owner_id: i32) -> StoreResult<Vec<Task>>;

    /// Overwrites every mutable column of an existing task. Returns `None`
    /// if the task no longer exists.
    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    /// Returns the number of tasks removed.
    async fn delete_tasks_by_owner(&self, owner_id: i32) -> StoreResult<u64>;
}
