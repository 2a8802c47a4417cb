use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The flat role set, ordered from least to most privileged.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Standard,
    Creator,
    Admin,
}

/// The acting user as seen by authorization code.
///
/// This is a projection of the `users` row that never carries the password
/// hash. It is loaded once per request and not mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// The full persisted user row. Only the login flow reads this type.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            is_verified: self.is_verified,
            created_at: self.created_at,
        }
    }
}

/// A user about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
}

impl NewUser {
    pub fn standard(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
            role: Role::Standard,
            is_verified: false,
        }
    }

    /// The first administrator, created verified so the `Verified` guard on
    /// admin routes can pass.
    pub fn bootstrap_admin(username: String, email: String, password_hash: String) -> Self {
        Self {
            role: Role::Admin,
            is_verified: true,
            ..Self::standard(username, email, password_hash)
        }
    }
}

/// Payload of the admin role-change endpoint.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}
