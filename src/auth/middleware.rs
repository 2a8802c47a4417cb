use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::credentials::CredentialExtractor;
use crate::auth::identity::{resolve_identity, AuthContext};
use crate::auth::token::TokenVerifier;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::UserStore;

/// The one authentication pipeline: extract, verify, resolve.
#[derive(Clone)]
pub struct Authenticator {
    extractor: CredentialExtractor,
    verifier: TokenVerifier,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(
        extractor: CredentialExtractor,
        verifier: TokenVerifier,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            extractor,
            verifier,
            users,
        }
    }

    pub fn extractor(&self) -> &CredentialExtractor {
        &self.extractor
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Runs the full pipeline against a request. A missing credential fails
    /// before the store is touched.
    pub async fn authenticate(&self, req: &HttpRequest) -> Result<AuthContext, AppError> {
        let token = self.extractor.extract_from_request(req)?;
        self.authenticate_token(&token).await
    }

    /// Verifies `token` and loads the identity it names.
    pub async fn authenticate_token(&self, token: &str) -> Result<AuthContext, AppError> {
        let claims = self.verifier.verify(token)?;
        resolve_identity(self.users.as_ref(), &claims).await
    }
}

/// Middleware that authenticates every request in the wrapped scope.
///
/// On success the resulting `AuthContext` is inserted into the request
/// extensions, where guards and the `AuthContext` extractor pick it up. On
/// failure the error is rendered as the response and the scope is not
/// entered.
pub struct Authenticate;

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthenticateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthenticateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let outcome = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.authenticator.authenticate(req.request()).await,
                None => Err(AppError::AuthFailure("application state missing".into())),
            };

            match outcome {
                Ok(ctx) => {
                    log::debug!("authenticated user {} for {}", ctx.user_id(), req.path());
                    req.extensions_mut().insert(ctx);
                    Ok(service.call(req).await?.map_into_left_body())
                }
                Err(app_err) => {
                    log::warn!(
                        "authentication failed for {} {}: {}",
                        req.method(),
                        req.path(),
                        app_err
                    );
                    Ok(req.error_response(app_err).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CredentialSource;
    use crate::models::{Identity, NewUser, Role, User};
    use crate::store::{MemoryStore, StoreResult};
    use actix_web::test::TestRequest;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts identity lookups so tests can prove the store was never reached.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for CountingStore {
        async fn create_user(&self, user: NewUser) -> StoreResult<User> {
            self.inner.create_user(user).await
        }
        async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
            self.inner.find_user_by_email(email).await
        }
        async fn find_identity(&self, id: i32) -> StoreResult<Option<Identity>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_identity(id).await
        }
        async fn list_identities(&self) -> StoreResult<Vec<Identity>> {
            self.inner.list_identities().await
        }
        async fn set_role(&self, id: i32, role: Role) -> StoreResult<Option<Identity>> {
            self.inner.set_role(id, role).await
        }
        async fn set_verified(&self, id: i32, verified: bool) -> StoreResult<Option<Identity>> {
            self.inner.set_verified(id, verified).await
        }
        async fn delete_user(&self, id: i32) -> StoreResult<bool> {
            self.inner.delete_user(id).await
        }
    }

    fn authenticator(store: Arc<CountingStore>) -> Authenticator {
        Authenticator::new(
            CredentialExtractor::new(
                "token",
                vec![CredentialSource::Cookie, CredentialSource::BearerHeader],
            ),
            TokenVerifier::new("middleware-test-secret", Duration::hours(1), 0),
            store,
        )
    }

    #[actix_rt::test]
    async fn test_missing_credential_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let auth = authenticator(Arc::clone(&store));

        let req = TestRequest::default().to_http_request();
        let result = auth.authenticate(&req).await;

        assert!(matches!(result, Err(AppError::MissingCredential)));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn test_bearer_token_resolves_identity() {
        let store = Arc::new(CountingStore::default());
        let user = store
            .create_user(NewUser::standard("frank".into(), "frank@example.com".into(), "h".into()))
            .await
            .unwrap();
        let auth = authenticator(Arc::clone(&store));
        let token = auth.verifier().issue(user.id).unwrap();

        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        let ctx = auth.authenticate(&req).await.unwrap();

        assert_eq!(ctx.user_id(), user.id);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[actix_rt::test]
    async fn test_bad_token_never_reaches_store() {
        let store = Arc::new(CountingStore::default());
        let auth = authenticator(Arc::clone(&store));

        let result = auth.authenticate_token("definitely.not.valid").await;
        assert!(matches!(result, Err(AppError::TokenMalformed)));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }
}
