pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPriority, TaskStatus, TaskUpdate, DEFAULT_DESCRIPTION};
pub use user::{Identity, NewUser, Role, RoleChange, User};
