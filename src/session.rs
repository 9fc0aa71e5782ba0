//! Per-request session context.
//!
//! A [`Session`] is resolved once per request from the session cookie and
//! handed down explicitly. Nothing here writes session state; the cookie is
//! issued by the API at login and cleared by the auth module at logout.

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use bookworm_authz::SessionCookie;

use crate::backend::{BackendApi, BackendError};
use crate::modules::users::User;

#[derive(Debug, Clone)]
pub enum Session {
    Anonymous,
    Authenticated { token: String, user: User },
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user, .. } => Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { token, .. } => Some(token),
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user, .. } => Some(user),
        }
    }
}

/// Resolves sessions against the API.
#[derive(Clone)]
pub struct SessionResolver {
    backend: Arc<dyn BackendApi>,
    cookie: SessionCookie,
}

impl SessionResolver {
    pub fn new(backend: Arc<dyn BackendApi>, cookie: SessionCookie) -> Self {
        Self { backend, cookie }
    }

    pub fn backend(&self) -> &Arc<dyn BackendApi> {
        &self.backend
    }

    /// No cookie, or a token the API no longer recognises, is an anonymous session.
    pub async fn resolve(&self, jar: &CookieJar) -> Result<Session, BackendError> {
        let Some(token) = self.cookie.token(jar) else {
            return Ok(Session::Anonymous);
        };

        match self.backend.current_user(&token).await? {
            Some(user) => {
                tracing::debug!(user_id = %user.id, "session resolved");
                Ok(Session::Authenticated { token, user })
            }
            None => Ok(Session::Anonymous),
        }
    }
}
