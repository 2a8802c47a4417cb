//! Authentication and authorization.
//!
//! A request passes through, in order:
//! 1. [`credentials`]: find the token (cookie or `Bearer` header),
//! 2. [`token`]: verify it and decode the claims,
//! 3. [`identity`]: load the caller and build the [`AuthContext`],
//! 4. [`guard`]: optional role / verification checks.
//!
//! Steps 1–3 run inside the [`Authenticate`] middleware; step 4 inside
//! [`RequireGuards`].

pub mod credentials;
pub mod extractors;
pub mod guard;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use credentials::{CredentialExtractor, CredentialSource, RequestCredentials};
pub use guard::{Guard, RequireGuards};
pub use identity::{resolve_identity, AuthContext};
pub use middleware::{Authenticate, Authenticator};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenVerifier};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Between 3 and 32 characters: letters, digits, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response body after a successful login or registration. The same token is
/// also set as the credential cookie.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_payload_rules() {
        let login = |email: &str, password: &str| LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        assert!(login("dana@example.com", "hunter22").validate().is_ok());
        assert!(login("dana.example.com", "hunter22").validate().is_err());
        assert!(login("dana@example.com", "12345").validate().is_err());
    }

    #[test]
    fn test_registration_username_rules() {
        let accepted: [&str; 4] = ["abc", "dana_k", "task-runner-9", &"x".repeat(32)];
        for username in accepted {
            assert!(
                register(username, "dana@example.com", "hunter22").validate().is_ok(),
                "{:?} should be accepted",
                username
            );
        }

        let rejected: [&str; 5] = ["ab", "has space", "semi;colon", "ünïcode", &"x".repeat(33)];
        for username in rejected {
            let errors = register(username, "dana@example.com", "hunter22")
                .validate()
                .expect_err("username should be rejected");
            assert!(errors.field_errors().contains_key("username"));
        }
    }

    #[test]
    fn test_registration_reports_every_bad_field() {
        let errors = register("ok_name", "nope", "123").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("username"));
    }

    #[test]
    fn test_auth_response_is_camel_case() {
        let body = serde_json::to_value(AuthResponse {
            token: "t".into(),
            user_id: 7,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "token": "t", "userId": 7 }));
    }
}
