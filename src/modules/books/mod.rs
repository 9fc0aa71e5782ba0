pub mod catalog;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use bookworm_http::AppError;
use bookworm_kernel::{InitCtx, Module};
use serde_json::json;

use crate::backend::BackendApi;
use models::{Book, BookId, CatalogQuery};

/// Books module: the read-only catalog served from the API
pub struct BooksModule {
    backend: Arc<dyn BackendApi>,
}

impl BooksModule {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = %ctx.settings.backend.base_url,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books))
            .route("/genres", get(list_genres))
            .route("/{id}", get(get_book))
            .with_state(self.backend.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Browse the catalog",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "genre",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" },
                                "description": "Exact genre, or All"
                            },
                            {
                                "name": "q",
                                "in": "query",
                                "required": false,
                                "schema": { "type": "string" },
                                "description": "Case-insensitive search over title and author"
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Matching books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "502": {
                                "description": "API unavailable",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/genres": {
                    "get": {
                        "summary": "Genre filter options",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Distinct genres, led by All",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "type": "string" } }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Book details",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": {
                                "description": "No such book",
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
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "cover": { "type": "string", "format": "uri", "nullable": true },
                            "genre": { "type": "string", "nullable": true },
                            "rating": { "type": "number", "nullable": true }
                        },
                        "required": ["id", "title", "author"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

async fn list_books(
    State(backend): State<Arc<dyn BackendApi>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = backend.list_books().await?;
    Ok(Json(catalog::filter(books, &query)))
}

async fn list_genres(
    State(backend): State<Arc<dyn BackendApi>>,
) -> Result<Json<Vec<String>>, AppError> {
    let books = backend.list_books().await?;
    Ok(Json(catalog::genres(&books)))
}

async fn get_book(
    State(backend): State<Arc<dyn BackendApi>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = BookId::new(id);
    backend
        .get_book(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

/// Create a new instance of the books module
pub fn create_module(backend: Arc<dyn BackendApi>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{book, FakeBackend};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    fn routes() -> Router {
        let backend = FakeBackend::new().with_books(vec![
            book("1", "The Midnight Library", "Matt Haig", "Fiction"),
            book("2", "Dune", "Frank Herbert", "Science Fiction"),
            book("3", "Project Hail Mary", "Andy Weir", "Science Fiction"),
        ]);
        BooksModule::new(Arc::new(backend)).routes()
    }

    async fn get(uri: &str) -> Response {
        routes()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_applies_query_filters() {
        let response = get("/?genre=Science%20Fiction&q=weir").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["title"], "Project Hail Mary");
    }

    #[tokio::test]
    async fn genres_lead_with_all() {
        let body = json_body(get("/genres").await).await;
        assert_eq!(body, json!(["All", "Fiction", "Science Fiction"]));
    }

    #[tokio::test]
    async fn get_book_by_id() {
        let response = get("/2").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["author"], "Frank Herbert");
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let response = get("/404").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("404"));
    }
}
