use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::identity::AuthContext;
use crate::error::AppError;

/// Hands the `AuthContext` attached by the `Authenticate` middleware to a
/// handler.
///
/// Handlers outside an authenticated scope that ask for it get a 401 with
/// `errorType: AUTH_ERROR`.
impl FromRequest for AuthContext {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().cloned() {
            Some(ctx) => ready(Ok(ctx)),
            None => {
                let err = AppError::AuthFailure(
                    "no authenticated identity on request; is Authenticate mounted?".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
