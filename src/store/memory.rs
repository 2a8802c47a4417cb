use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{Identity, NewUser, Role, Task, User};

#[derive(Default)]
struct Tables {
    next_user_id: i32,
    users: HashMap<i32, User>,
    tasks: HashMap<Uuid, Task>,
}

/// In-process store. Unique constraints are checked under the write lock so
/// it behaves like the Postgres indexes under concurrent writers.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks with exactly this title.
    pub async fn count_tasks_titled(&self, title: &str) -> usize {
        let tables = self.tables.read().await;
        tables.tasks.values().filter(|t| t.title == title).count()
    }

    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_verified: new_user.is_verified,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_identity(&self, id: i32) -> StoreResult<Option<Identity>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(User::identity))
    }

    async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
        let tables = self.tables.read().await;
        let mut identities: Vec<Identity> = tables.users.values().map(User::identity).collect();
        identities.sort_by_key(|i| i.id);
        Ok(identities)
    }

    async fn set_role(&self, id: i32, role: Role) -> StoreResult<Option<Identity>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.role = role;
            user.identity()
        }))
    }

    async fn set_verified(&self, id: i32, verified: bool) -> StoreResult<Option<Identity>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.is_verified = verified;
            user.identity()
        }))
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        if tables.tasks.values().any(|t| t.title == task.title) {
            return Err(StoreError::Conflict(
                "A task with this title already exists".into(),
            ));
        }
        tables.tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.get(&id).cloned())
    }

    async fn find_task_by_title(&self, title: &str) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.values().find(|t| t.title == title).cloned())
    }

    async fn list_tasks_by_owner(&self, owner_id: i32) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|t| t.user_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        if tables
            .tasks
            .values()
            .any(|t| t.id != task.id && t.title == task.title)
        {
            return Err(StoreError::Conflict(
                "A task with this title already exists".into(),
            ));
        }
        match tables.tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.remove(&id).is_some())
    }

    async fn delete_tasks_by_owner(&self, owner_id: i32) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|_, t| t.user_id != owner_id);
        Ok((before - tables.tasks.len()) as u64)
    }
}
