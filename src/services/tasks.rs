//! Ownership-scoped task operations.
//!
//! Every operation takes the caller's [`AuthContext`]. Tasks are private to
//! their owner, so no role guard applies here; the only authorization rule is
//! that the stored `user_id` must equal the caller's id. Lookups always check
//! existence before ownership.

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskUpdate};
use crate::store::TaskStore;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Creates a task owned by the caller.
    ///
    /// The title is trimmed and must be non-empty and globally unique. A
    /// concurrent create that slips past the existence check is caught by the
    /// store's unique constraint and reported the same way.
    pub async fn create(&self, ctx: &AuthContext, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::ValidationError("Task title is required".into()));
        }

        if self.store.find_task_by_title(&title).await?.is_some() {
            return Err(AppError::DuplicateResource(
                "A task with this title already exists".into(),
            ));
        }

        let task = Task::new(title, input, ctx.user_id());
        let created = self.store.insert_task(&task).await?;
        log::info!("user {} created task {}", ctx.user_id(), created.id);
        Ok(created)
    }

    /// All of the caller's tasks, newest first.
    pub async fn list_mine(&self, ctx: &AuthContext) -> Result<Vec<Task>, AppError> {
        Ok(self.store.list_tasks_by_owner(ctx.user_id()).await?)
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<Task, AppError> {
        self.find_owned(ctx, id).await
    }

    /// Applies a truthy-merge update. See [`Task::apply_update`].
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        update: TaskUpdate,
    ) -> Result<Task, AppError> {
        let mut task = self.find_owned(ctx, id).await?;
        update.validate()?;

        task.apply_update(update);

        self.store
            .save_task(&task)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    pub async fn delete(&self, ctx: &AuthContext, id: Uuid) -> Result<(), AppError> {
        let task = self.find_owned(ctx, id).await?;
        if !self.store.delete_task(task.id).await? {
            return Err(AppError::NotFound("Task not found".into()));
        }
        log::info!("user {} deleted task {}", ctx.user_id(), task.id);
        Ok(())
    }

    /// Deletes every task the caller owns and returns how many were removed.
    /// Owning no tasks is reported as `NotFound`.
    pub async fn delete_all_mine(&self, ctx: &AuthContext) -> Result<u64, AppError> {
        let removed = self.store.delete_tasks_by_owner(ctx.user_id()).await?;
        if removed == 0 {
            return Err(AppError::NotFound("No tasks found".into()));
        }
        log::info!("user {} deleted all {} of their tasks", ctx.user_id(), removed);
        Ok(removed)
    }

    async fn find_owned(&self, ctx: &AuthContext, id: Uuid) -> Result<Task, AppError> {
        let task = self
            .store
            .find_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

        if task.user_id != ctx.user_id() {
            log::warn!(
                "user {} tried to access task {} owned by {}",
                ctx.user_id(),
                task.id,
                task.user_id
            );
            return Err(AppError::forbidden("not_owner"));
        }
        Ok(task)
    }
}
