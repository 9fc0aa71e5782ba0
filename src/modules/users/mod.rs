use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use bookworm_http::AppError;
use bookworm_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::modules::shelf::status::ShelfCollections;
use crate::session::SessionResolver;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Anything but a case-insensitive `admin` is a regular user.
    pub fn from_api(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// A signed-in reader, as resolved from the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: Role,
    pub shelves: ShelfCollections,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Users module: exposes the session's own profile
pub struct UsersModule {
    sessions: SessionResolver,
}

impl UsersModule {
    pub fn new(sessions: SessionResolver) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/me", get(current_user))
            .with_state(self.sessions.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/me": {
                    "get": {
                        "summary": "The signed-in user and their shelves",
                        "tags": ["Users"],
                        "responses": {
                            "200": {
                                "description": "Current user",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/User" }
                                    }
                                }
                            },
                            "401": {
                                "description": "No session",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "email": { "type": "string" },
                            "photo": { "type": "string", "format": "uri", "nullable": true },
                            "role": { "type": "string", "enum": ["user", "admin"] },
                            "shelves": { "$ref": "#/components/schemas/ShelfCollections" }
                        },
                        "required": ["id", "name", "email", "role", "shelves"]
                    }
                }
            }
        }))
    }
}

async fn current_user(
    State(sessions): State<SessionResolver>,
    jar: CookieJar,
) -> Result<Json<User>, AppError> {
    let session = sessions.resolve(&jar).await?;
    session
        .into_user()
        .map(Json)
        .ok_or_else(|| AppError::unauthorized("sign in to see your profile"))
}

pub fn create_module(sessions: SessionResolver) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(UsersModule::new(sessions))
}
