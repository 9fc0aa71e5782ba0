//! Reading shelves: status derivation, forward-only transitions, and the
//! write path to the API.

pub mod error;
pub mod in_flight;
pub mod routes;
pub mod service;
pub mod status;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookworm_kernel::{InitCtx, Module};
use serde_json::json;

use crate::session::SessionResolver;
use routes::ShelfState;
use service::ShelfService;

pub struct ShelfModule {
    state: ShelfState,
}

impl ShelfModule {
    pub fn new(sessions: SessionResolver) -> Self {
        let service = ShelfService::new(sessions.backend().clone());
        Self {
            state: ShelfState { sessions, service },
        }
    }
}

#[async_trait]
impl Module for ShelfModule {
    fn name(&self) -> &'static str {
        "shelf"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "shelf module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let status = json!({
            "type": "string",
            "enum": ["NONE", "WANT_TO_READ", "CURRENTLY_READING", "READ"]
        });
        let shelf = json!({ "type": "array", "items": { "$ref": "#/components/schemas/BookRef" } });
        let error = json!({
            "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } }
        });
        let book_id = json!([
            { "name": "book_id", "in": "path", "required": true, "schema": { "type": "string" } }
        ]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "The signed-in user's library, one list per shelf",
                        "tags": ["Shelf"],
                        "responses": {
                            "200": {
                                "description": "Library",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ShelfCollections" }
                                    }
                                }
                            },
                            "401": { "description": "No session", "content": error.clone() }
                        }
                    }
                },
                "/{book_id}": {
                    "get": {
                        "summary": "Shelf status of a book and the transitions on offer",
                        "tags": ["Shelf"],
                        "parameters": book_id.clone(),
                        "responses": {
                            "200": {
                                "description": "Shelf view",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ShelfView" }
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Move a book forward to another shelf",
                        "tags": ["Shelf"],
                        "parameters": book_id,
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "status": status.clone() },
                                        "required": ["status"]
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Shelf view after the move",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ShelfView" }
                                    }
                                }
                            },
                            "401": { "description": "No session", "content": error.clone() },
                            "409": {
                                "description": "Transition not allowed, or one is already in progress",
                                "content": error.clone()
                            },
                            "422": { "description": "Unknown status", "content": error.clone() },
                            "502": { "description": "The API rejected the write", "content": error }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "ShelfStatus": status,
                    "BookRef": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "cover": { "type": "string", "format": "uri" },
                            "genre": { "type": "string" },
                            "rating": { "type": "number" }
                        },
                        "required": ["id"]
                    },
                    "ShelfCollections": {
                        "type": "object",
                        "properties": {
                            "want_to_read": shelf.clone(),
                            "currently_reading": shelf.clone(),
                            "read": shelf
                        }
                    },
                    "ShelfView": {
                        "type": "object",
                        "properties": {
                            "book_id": { "type": "string" },
                            "status": { "$ref": "#/components/schemas/ShelfStatus" },
                            "allowed_transitions": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/ShelfStatus" }
                            },
                            "tracked": { "type": "boolean" },
                            "busy": { "type": "boolean" }
                        },
                        "required": ["book_id", "status", "allowed_transitions", "tracked", "busy"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "shelf module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let pending = self.state.service.pending_writes();
        if pending > 0 {
            tracing::warn!(module = self.name(), pending, "stopping with shelf writes in flight");
        }
        tracing::info!(module = self.name(), "shelf module stopped");
        Ok(())
    }
}

pub fn create_module(sessions: SessionResolver) -> Arc<dyn Module> {
    Arc::new(ShelfModule::new(sessions))
}
