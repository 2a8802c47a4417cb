use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::{Identity, Role};
use crate::store::UserStore;

/// The authenticated caller, attached once per request by the
/// `Authenticate` middleware.
///
/// Fields are private and there are no setters: once built, every guard and
/// handler sees the same identity for the rest of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    identity: Identity,
}

impl AuthContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> i32 {
        self.identity.id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn is_verified(&self) -> bool {
        self.identity.is_verified
    }
}

/// Loads the identity named by `claims.sub`.
///
/// A structurally valid token whose subject has since been deleted fails with
/// `IdentityNotFound`.
pub async fn resolve_identity(
    users: &dyn UserStore,
    claims: &Claims,
) -> Result<AuthContext, AppError> {
    match users.find_identity(claims.sub).await? {
        Some(identity) => Ok(AuthContext::new(identity)),
        None => {
            log::warn!("token subject {} no longer exists", claims.sub);
            Err(AppError::IdentityNotFound)
        }
    }
}
