#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use tasktracker::auth::{hash_password, AuthResponse};
use tasktracker::models::{NewUser, Role};
use tasktracker::routes::{self, health};
use tasktracker::store::{MemoryStore, UserStore};
use tasktracker::{AppState, Config};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "password123";

/// Everything a test needs: the shared state for the app and a handle on the
/// backing store so tests can inspect or mutate it directly.
pub struct TestEnv {
    pub state: web::Data<AppState>,
    pub store: Arc<MemoryStore>,
}

pub struct TestUser {
    pub id: i32,
    pub token: String,
}

/// Test configuration; `overrides` take precedence over the defaults.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key: &str| {
        if let Some((_, value)) = overrides.iter().find(|(k, _)| *k == key) {
            return Some(value.to_string());
        }
        match key {
            "DATABASE_URL" => Some("postgres://unused".to_string()),
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            "BCRYPT_COST" => Some("4".to_string()),
            _ => None,
        }
    })
    .expect("test config should be valid")
}

pub fn test_env() -> TestEnv {
    test_env_with(&[])
}

pub fn test_env_with(overrides: &[(&str, &str)]) -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(&test_config(overrides), store.clone(), store.clone());
    TestEnv {
        state: web::Data::new(state),
        store,
    }
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config),
    )
    .await
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
) -> Result<TestUser, String> {
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse registration response: {}", e))?;

    Ok(TestUser {
        id: auth.user_id,
        token: auth.token,
    })
}

/// Creates a user straight in the store with the given role and verification
/// flag, then issues a token for them.
pub async fn seed_user(env: &TestEnv, username: &str, role: Role, is_verified: bool) -> TestUser {
    let password_hash = hash_password(PASSWORD, 4).expect("hashing should succeed");
    let user = env
        .store
        .create_user(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash,
            role,
            is_verified,
        })
        .await
        .expect("seeding a user should succeed");
    let token = env
        .state
        .authenticator
        .verifier()
        .issue(user.id)
        .expect("issuing a token should succeed");

    TestUser { id: user.id, token }
}

pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    user: &TestUser,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(bearer(&user.token))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "task creation should succeed");
    test::read_body_json(resp).await
}
