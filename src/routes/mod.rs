pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::Authenticate;
use crate::error::AppError;

/// Mounts the `/api/v1` surface.
///
/// `/api/v1/auth` is public. Everything else under `/api/v1` sits behind
/// `Authenticate`; the admin resources add their own guard chains.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .service(auth::register)
                    .service(auth::login)
                    .service(auth::logout),
            )
            .service(
                web::scope("")
                    .wrap(Authenticate)
                    .service(users::me)
                    .configure(users::admin_config)
                    .service(tasks::create_task)
                    .service(tasks::get_tasks)
                    .service(tasks::delete_all_tasks)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            ),
    );
}

/// Malformed JSON bodies become `ValidationError`s with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
