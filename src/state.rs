use std::sync::Arc;

use crate::auth::{Authenticator, CredentialExtractor, TokenVerifier};
use crate::config::Config;
use crate::services::TaskService;
use crate::store::{TaskStore, UserStore};

/// Cookie settings used when login sets or logout clears the credential cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

/// Shared, read-only application state handed to every worker via `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: TaskService,
    pub authenticator: Authenticator,
    pub cookie: CookieSettings,
    pub bcrypt_cost: u32,
    pub admin_email: Option<String>,
}

impl AppState {
    pub fn new(config: &Config, users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>) -> Self {
        let verifier = TokenVerifier::new(
            &config.jwt_secret,
            chrono::Duration::hours(config.token_ttl_hours),
            config.token_leeway_secs,
        );
        let extractor =
            CredentialExtractor::new(config.cookie_name.clone(), config.credential_sources.clone());

        Self {
            authenticator: Authenticator::new(extractor, verifier, Arc::clone(&users)),
            users,
            tasks: TaskService::new(tasks),
            cookie: CookieSettings {
                name: config.cookie_name.clone(),
                secure: config.production,
            },
            bcrypt_cost: config.bcrypt_cost,
            admin_email: config.admin_email.clone(),
        }
    }

    /// True when `email` is the configured bootstrap admin address.
    pub fn is_bootstrap_admin(&self, email: &str) -> bool {
        self.admin_email
            .as_deref()
            .map_or(false, |admin| admin.eq_ignore_ascii_case(email.trim()))
    }
}
