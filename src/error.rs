//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type returned by the
//! authentication pipeline, the authorization guards, the task service and the
//! HTTP handlers.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so every failure is
//! rendered as a JSON body of the shape `{"message": ..., "errorType": ...}`
//! with the matching HTTP status. `From` implementations for store, validation,
//! bcrypt and JWT errors allow the `?` operator to be used throughout.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use validator::ValidationErrors;

use crate::store::StoreError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Neither the token cookie nor a `Bearer` header carried a credential (HTTP 401).
    MissingCredential,
    /// The token's `exp` claim is in the past (HTTP 401).
    TokenExpired,
    /// The token failed signature validation or could not be decoded (HTTP 401).
    TokenMalformed,
    /// Any other authentication failure (HTTP 401).
    AuthFailure(String),
    /// The token was valid but its subject no longer exists (HTTP 404).
    IdentityNotFound,
    /// An authorization guard or the ownership check denied the request (HTTP 403).
    ///
    /// `reason` is a stable machine-readable code such as `admin_required`
    /// or `not_owner`.
    Forbidden { reason: &'static str },
    /// Login with an unknown email or a wrong password (HTTP 401).
    InvalidCredentials,
    /// Input failed validation (HTTP 400).
    ValidationError(String),
    /// A unique field (task title, user email) is already taken (HTTP 400).
    DuplicateResource(String),
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// The backing store failed (HTTP 500).
    StorageFailure(String),
}

impl AppError {
    /// Shorthand for [`AppError::Forbidden`].
    pub fn forbidden(reason: &'static str) -> Self {
        AppError::Forbidden { reason }
    }

    /// The `errorType` code sent to clients.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MissingCredential => "MISSING_TOKEN",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenMalformed => "INVALID_TOKEN",
            AppError::AuthFailure(_) => "AUTH_ERROR",
            AppError::IdentityNotFound => "USER_NOT_FOUND",
            AppError::Forbidden { .. } => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DuplicateResource(_) => "DUPLICATE_RESOURCE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::StorageFailure(_) => "SERVER_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::MissingCredential => "Not authorized, please login".into(),
            AppError::TokenExpired => "Session expired, please login again".into(),
            AppError::TokenMalformed => "Invalid token".into(),
            AppError::AuthFailure(_) => "Not authorized".into(),
            AppError::IdentityNotFound => "User not found".into(),
            AppError::Forbidden { reason } => match *reason {
                "admin_required" => "Not authorized as an admin".into(),
                "creator_required" => "Creator or admin role required".into(),
                "unverified_email" => "Please verify your email address".into(),
                "not_owner" => "You are not the owner of this task".into(),
                other => format!("Forbidden: {}", other),
            },
            AppError::InvalidCredentials => "Invalid credentials".into(),
            AppError::ValidationError(msg)
            | AppError::DuplicateResource(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::StorageFailure(_) => "Internal server error".into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::MissingCredential => write!(f, "Missing credential"),
            AppError::TokenExpired => write!(f, "Token expired"),
            AppError::TokenMalformed => write!(f, "Token malformed"),
            AppError::AuthFailure(msg) => write!(f, "Authentication failed: {}", msg),
            AppError::IdentityNotFound => write!(f, "Identity not found"),
            AppError::Forbidden { reason } => write!(f, "Forbidden: {}", reason),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DuplicateResource(msg) => write!(f, "Duplicate: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::StorageFailure(msg) => write!(f, "Storage Error: {}", msg),
        }
    }
}

/// Whether 500 responses carry the underlying storage error as `detail`.
/// Off until [`set_expose_storage_detail`] is called.
static EXPOSE_STORAGE_DETAIL: AtomicBool = AtomicBool::new(false);

/// Set once at startup from the configured environment; only
/// non-production deployments expose storage detail.
pub fn set_expose_storage_detail(expose: bool) {
    EXPOSE_STORAGE_DETAIL.store(expose, Ordering::Relaxed);
}

impl AppError {
    /// The JSON error body.
    fn body(&self, expose_storage_detail: bool) -> serde_json::Value {
        let mut body = json!({
            "message": self.message(),
            "errorType": self.error_type(),
        });
        match self {
            AppError::Forbidden { reason } => {
                body["reason"] = json!(reason);
            }
            AppError::StorageFailure(detail) if expose_storage_detail => {
                body["detail"] = json!(detail);
            }
            _ => {}
        }
        body
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential
            | AppError::TokenExpired
            | AppError::TokenMalformed
            | AppError::AuthFailure(_)
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::IdentityNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::ValidationError(_) | AppError::DuplicateResource(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = self.body(EXPOSE_STORAGE_DETAIL.load(Ordering::Relaxed));
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Unique-constraint conflicts become `DuplicateResource`; everything else is
/// a storage failure.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Conflict(what) => AppError::DuplicateResource(what),
            StoreError::Backend(msg) => {
                log::error!("store failure: {}", msg);
                AppError::StorageFailure(msg)
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into the matching token failure.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        use jsonwebtoken::errors::ErrorKind;

        match error.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AppError::TokenMalformed,
            _ => AppError::AuthFailure(error.to_string()),
        }
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::StorageFailure`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::StorageFailure(format!("password hashing failed: {}", error))
    }
}
