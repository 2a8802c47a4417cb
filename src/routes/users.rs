use crate::{
    auth::{AuthContext, Guard, RequireGuards},
    error::AppError,
    models::RoleChange,
    state::AppState,
};
use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

/// Returns the caller's own identity.
#[get("/user")]
pub async fn me(ctx: AuthContext) -> impl Responder {
    HttpResponse::Ok().json(ctx.identity())
}

/// Mounts `/admin/users`. Each resource carries its own guard chain:
/// listing needs `Creator`, role changes need `Verified` then `Admin`, and
/// marking a user verified or deleting one needs `Admin`.
pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin/users")
            .wrap(RequireGuards::new([Guard::Creator]))
            .route(web::get().to(list_users)),
    )
    .service(
        web::resource("/admin/users/{id}/role")
            .wrap(RequireGuards::new([Guard::Verified, Guard::Admin]))
            .route(web::patch().to(change_role)),
    )
    .service(
        web::resource("/admin/users/{id}/verify")
            .wrap(RequireGuards::new([Guard::Admin]))
            .route(web::patch().to(verify_user)),
    )
    .service(
        web::resource("/admin/users/{id}")
            .wrap(RequireGuards::new([Guard::Admin]))
            .route(web::delete().to(delete_user)),
    );
}

async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = state.users.list_identities().await?;
    Ok(HttpResponse::Ok().json(json!({
        "length": users.len(),
        "users": users,
    })))
}

async fn change_role(
    state: web::Data<AppState>,
    ctx: AuthContext,
    user_id: web::Path<i32>,
    body: web::Json<RoleChange>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    let identity = state
        .users
        .set_role(user_id, body.role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    log::info!(
        "admin {} set role of user {} to {:?}",
        ctx.user_id(),
        user_id,
        identity.role
    );
    Ok(HttpResponse::Ok().json(identity))
}

/// Marks the user's email as verified. No verification mail is sent; an
/// admin confirms the address.
async fn verify_user(
    state: web::Data<AppState>,
    ctx: AuthContext,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    let identity = state
        .users
        .set_verified(user_id, true)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    log::info!("admin {} verified user {}", ctx.user_id(), user_id);
    Ok(HttpResponse::Ok().json(identity))
}

/// Removes the user. Their tasks are left in place.
async fn delete_user(
    state: web::Data<AppState>,
    ctx: AuthContext,
    user_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_id = user_id.into_inner();
    if !state.users.delete_user(user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    log::info!("admin {} deleted user {}", ctx.user_id(), user_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}
