use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::identity::AuthContext;
use crate::error::AppError;
use crate::models::Role;

/// A role or verification predicate over an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Role must be `admin`.
    Admin,
    /// Role must be `creator` or `admin`.
    Creator,
    /// The email address must be verified.
    Verified,
}

impl Guard {
    pub fn check(self, ctx: &AuthContext) -> Result<(), AppError> {
        let passed = match self {
            Guard::Admin => ctx.role() == Role::Admin,
            Guard::Creator => matches!(ctx.role(), Role::Creator | Role::Admin),
            Guard::Verified => ctx.is_verified(),
        };
        if passed {
            Ok(())
        } else {
            Err(AppError::forbidden(self.reason()))
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Guard::Admin => "admin_required",
            Guard::Creator => "creator_required",
            Guard::Verified => "unverified_email",
        }
    }
}

/// Runs `guards` in order, stopping at the first failure.
pub fn check_all(guards: &[Guard], ctx: &AuthContext) -> Result<(), AppError> {
    guards.iter().try_for_each(|guard| guard.check(ctx))
}

/// Middleware that gates a scope or resource behind a chain of [`Guard`]s.
///
/// Must sit inside `Authenticate`; it reads the `AuthContext` that middleware
/// attached and never re-derives the identity. When a guard fails the inner
/// service is not called and the error is rendered as the response.
pub struct RequireGuards {
    guards: Rc<[Guard]>,
}

impl RequireGuards {
    pub fn new(guards: impl IntoIterator<Item = Guard>) -> Self {
        Self {
            guards: guards.into_iter().collect(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireGuards
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireGuardsService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireGuardsService {
            service,
            guards: Rc::clone(&self.guards),
        }))
    }
}

pub struct RequireGuardsService<S> {
    service: S,
    guards: Rc<[Guard]>,
}

impl<S, B> Service<ServiceRequest> for RequireGuardsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verdict = match req.extensions().get::<AuthContext>() {
            Some(ctx) => check_all(&self.guards, ctx),
            None => Err(AppError::AuthFailure(
                "guard reached without an authenticated identity".into(),
            )),
        };

        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(app_err) => {
                log::debug!("{} {} denied: {}", req.method(), req.path(), app_err);
                let res = req.error_response(app_err).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
