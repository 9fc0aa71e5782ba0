//! Route gating: protected paths need a session cookie.
//!
//! Only presence is checked here. Whether the token is still valid is up to
//! the external API when the session is resolved.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use bookworm_http::AppError;
use bookworm_kernel::settings::AuthSettings;

use crate::session::SessionCookie;

#[derive(Debug)]
struct Gate {
    cookie: SessionCookie,
    login_path: String,
    protected_paths: Vec<String>,
}

impl Gate {
    fn guards(&self, path: &str) -> bool {
        self.protected_paths.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Wrap `router` so anonymous requests to protected paths never reach it.
///
/// Page paths redirect to the login page; paths under `/api/` answer 401.
pub fn protect(router: Router, settings: &AuthSettings) -> Router {
    let gate = Arc::new(Gate {
        cookie: SessionCookie::new(settings),
        login_path: settings.login_path.clone(),
        protected_paths: settings.protected_paths.clone(),
    });

    router.layer(middleware::from_fn_with_state(gate, check))
}

async fn check(
    State(gate): State<Arc<Gate>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if !gate.guards(&path) || gate.cookie.token(&jar).is_some() {
        return next.run(request).await;
    }

    tracing::debug!(%path, "anonymous request to protected path");

    if path.starts_with("/api/") {
        AppError::unauthorized("a session is required").into_response()
    } else {
        Redirect::to(&gate.login_path).into_response()
    }
}
