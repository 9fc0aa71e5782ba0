//! The session cookie: the only place session state is written on this side.

use axum::{extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use bookworm_kernel::settings::AuthSettings;

/// Reads and clears the API-issued session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
}

impl SessionCookie {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            name: settings.cookie_name.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The session token, if the request carries a non-empty cookie.
    pub fn token(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value().trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Remove the session cookie from the client.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(self.name.clone()).path("/"))
    }
}

pub(crate) async fn logout(
    State(cookie): State<SessionCookie>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    if cookie.token(&jar).is_some() {
        tracing::info!(cookie = cookie.name(), "session cookie cleared");
    }
    (cookie.clear(jar), StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header, http::Request, routing::post, Router};
    use tower::ServiceExt;

    fn session_cookie() -> SessionCookie {
        SessionCookie::new(&AuthSettings::default())
    }

    #[test]
    fn token_reads_configured_cookie() {
        let jar = CookieJar::new().add(Cookie::new("token", "abc123"));
        assert_eq!(session_cookie().token(&jar).as_deref(), Some("abc123"));
    }

    #[test]
    fn blank_cookie_is_no_session() {
        let jar = CookieJar::new().add(Cookie::new("token", "  "));
        assert_eq!(session_cookie().token(&jar), None);
        assert_eq!(session_cookie().token(&CookieJar::new()), None);
    }

    #[tokio::test]
    async fn logout_expires_cookie() {
        let app = Router::new()
            .route("/logout", post(logout))
            .with_state(session_cookie());

        let response = app
            .oneshot(
                Request::post("/logout")
                    .header(header::COOKIE, "token=abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(set_cookie.starts_with("token="));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
