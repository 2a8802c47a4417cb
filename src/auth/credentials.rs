//! Locating the credential token on an incoming request.

use actix_web::{http::header, HttpRequest};
use std::str::FromStr;

use crate::error::AppError;

/// A transport location that may carry the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The token cookie (name is configurable, `token` by default).
    Cookie,
    /// `Authorization: Bearer <token>`.
    BearerHeader,
}

impl FromStr for CredentialSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cookie" => Ok(CredentialSource::Cookie),
            "header" | "bearer" => Ok(CredentialSource::BearerHeader),
            other => Err(format!("unknown credential source `{}`", other)),
        }
    }
}

/// The raw credential carriers read off a request.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestCredentials<'a> {
    pub cookie: Option<&'a str>,
    pub authorization: Option<&'a str>,
}

/// Finds a token on a request by trying each configured source in order.
#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    cookie_name: String,
    sources: Vec<CredentialSource>,
}

impl Default for CredentialExtractor {
    fn default() -> Self {
        Self::new(
            "token",
            vec![CredentialSource::Cookie, CredentialSource::BearerHeader],
        )
    }
}

impl CredentialExtractor {
    pub fn new(cookie_name: impl Into<String>, sources: Vec<CredentialSource>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sources,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Pulls the token cookie and `Authorization` header off `req`.
    pub fn extract_from_request(&self, req: &HttpRequest) -> Result<String, AppError> {
        let cookie = req.cookie(&self.cookie_name);
        let credentials = RequestCredentials {
            cookie: cookie.as_ref().map(|c| c.value()),
            authorization: req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok()),
        };
        self.extract(&credentials)
    }

    /// Returns the first token found, or `MissingCredential`.
    pub fn extract(&self, credentials: &RequestCredentials<'_>) -> Result<String, AppError> {
        for source in &self.sources {
            let found = match source {
                CredentialSource::Cookie => credentials.cookie.filter(|v| !v.is_empty()),
                CredentialSource::BearerHeader => credentials.authorization.and_then(bearer_token),
            };
            if let Some(token) = found {
                log::debug!("credential found in {:?}", source);
                return Ok(token.to_string());
            }
        }
        Err(AppError::MissingCredential)
    }
}

/// `"Bearer abc"` yields `abc`. The token is the segment right after the
/// single space, so `"Bearer  abc"` (two spaces) yields nothing.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .and_then(|rest| rest.split(' ').next())
        .filter(|token| !token.is_empty())
}
