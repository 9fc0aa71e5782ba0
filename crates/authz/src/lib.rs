//! Session cookie handling and route gating.
//!
//! Login happens against the external API, which issues the session cookie.
//! This crate only reads that cookie, clears it on logout, and keeps anonymous
//! visitors away from protected pages.

pub mod gate;
pub mod session;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use bookworm_kernel::{settings::AuthSettings, InitCtx, Module};
use serde_json::json;

pub use gate::protect;
pub use session::SessionCookie;

/// Core module exposing the session endpoints under `/api/auth`
pub struct AuthModule {
    cookie: SessionCookie,
}

impl AuthModule {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            cookie: SessionCookie::new(settings),
        }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            cookie = %ctx.settings.auth.cookie_name,
            protected = ?ctx.settings.auth.protected_paths,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/logout", post(session::logout))
            .with_state(self.cookie.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/logout": {
                    "post": {
                        "summary": "End the current session by clearing the session cookie",
                        "tags": ["Auth"],
                        "responses": {
                            "204": { "description": "Session cookie removed" }
                        }
                    }
                }
            }
        }))
    }
}

pub fn create_module(settings: &AuthSettings) -> Arc<dyn Module> {
    Arc::new(AuthModule::new(settings))
}
