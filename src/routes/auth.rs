use crate::{
    auth::{hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest},
    error::AppError,
    models::NewUser,
    state::{AppState, CookieSettings},
};
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    post, web, HttpResponse, Responder,
};
use validator::Validate;

fn token_cookie(settings: &CookieSettings, token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(settings.name.clone(), token.to_string())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

fn authenticated_response(
    state: &AppState,
    mut builder: actix_web::HttpResponseBuilder,
    user_id: i32,
) -> Result<HttpResponse, AppError> {
    let verifier = state.authenticator.verifier();
    let token = verifier.issue(user_id)?;
    let cookie = token_cookie(&state.cookie, &token, verifier.ttl().num_seconds());
    Ok(builder.cookie(cookie).json(AuthResponse { token, user_id }))
}

/// Register a new user
///
/// Creates a standard, unverified account and returns a token. The token is
/// also set as the credential cookie. Registering with the configured
/// `ADMIN_EMAIL` creates a verified admin instead.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();

    if state
        .users
        .find_user_by_email(&register_data.email)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateResource("Email already registered".into()));
    }

    let password_hash = hash_password(&register_data.password, state.bcrypt_cost)?;
    let new_user = if state.is_bootstrap_admin(&register_data.email) {
        NewUser::bootstrap_admin(register_data.username, register_data.email, password_hash)
    } else {
        NewUser::standard(register_data.username, register_data.email, password_hash)
    };
    let user = state.users.create_user(new_user).await?;
    log::info!("registered user {} as {:?}", user.id, user.role);

    authenticated_response(&state, HttpResponse::Created(), user.id)
}

/// Login user
///
/// Unknown emails and wrong passwords are indistinguishable to the caller.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = state
        .users
        .find_user_by_email(&login_data.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&login_data.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    authenticated_response(&state, HttpResponse::Ok(), user.id)
}

/// Logout user
///
/// Clears the credential cookie. Bearer tokens stay valid until they expire.
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    let mut cookie = Cookie::build(state.cookie.name.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "message": "Logged out" }))
}
