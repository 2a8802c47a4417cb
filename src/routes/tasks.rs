use crate::{
    auth::AuthContext,
    error::AppError,
    models::{TaskInput, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Creates a new task for the authenticated user.
///
/// The owner is always the caller; any owner field in the body is ignored.
///
/// ## Request Body:
/// - `title`: required, trimmed, globally unique.
/// - `description`, `dueDate`, `priority` (`low|medium|high`),
///   `status` (`active|inactive`), `completed`: optional.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: blank title (`VALIDATION_ERROR`) or title taken
///   (`DUPLICATE_RESOURCE`).
/// - `401 Unauthorized`: missing or invalid credential.
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<AppState>,
    ctx: AuthContext,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(&ctx, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Lists the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: `{"length": n, "tasks": [...]}`.
#[get("/tasks")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    ctx: AuthContext,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_mine(&ctx).await?;
    Ok(HttpResponse::Ok().json(json!({
        "length": tasks.len(),
        "tasks": tasks,
    })))
}

/// Deletes every task the caller owns.
///
/// ## Responses:
/// - `200 OK`: confirmation message.
/// - `404 Not Found`: the caller owns no tasks.
#[delete("/tasks")]
pub async fn delete_all_tasks(
    state: web::Data<AppState>,
    ctx: AuthContext,
) -> Result<impl Responder, AppError> {
    let removed = state.tasks.delete_all_mine(&ctx).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "All tasks deleted successfully",
        "deleted": removed,
    })))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `403 Forbidden`: the task belongs to someone else (`reason: not_owner`).
/// - `404 Not Found`: no such task.
#[get("/tasks/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    ctx: AuthContext,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(&ctx, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task the caller owns.
///
/// A field overwrites the stored value only when it is truthy: empty strings
/// and `completed: false` leave the stored value untouched.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: the new title is taken.
/// - `403 Forbidden`: not the owner.
/// - `404 Not Found`: no such task.
#[patch("/tasks/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    ctx: AuthContext,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(&ctx, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the caller owns.
///
/// ## Responses:
/// - `200 OK`: confirmation message.
/// - `403 Forbidden`: not the owner.
/// - `404 Not Found`: no such task.
#[delete("/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    ctx: AuthContext,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(&ctx, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
