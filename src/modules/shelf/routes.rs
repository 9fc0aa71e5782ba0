use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use bookworm_http::AppError;
use serde::Deserialize;
use serde_json::json;

use super::service::{LibraryView, ShelfService, ShelfView};
use super::status::ShelfStatus;
use crate::modules::books::models::BookId;
use crate::session::SessionResolver;

#[derive(Clone)]
pub struct ShelfState {
    pub sessions: SessionResolver,
    pub service: ShelfService,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

pub fn router(state: ShelfState) -> Router {
    Router::new()
        .route("/", get(library))
        .route("/{book_id}", get(status).put(transition))
        .with_state(state)
}

async fn library(
    State(state): State<ShelfState>,
    jar: CookieJar,
) -> Result<Json<LibraryView>, AppError> {
    let session = state.sessions.resolve(&jar).await?;
    Ok(Json(state.service.library(&session)?))
}

async fn status(
    State(state): State<ShelfState>,
    Path(book_id): Path<String>,
    jar: CookieJar,
) -> Result<Json<ShelfView>, AppError> {
    let session = state.sessions.resolve(&jar).await?;
    Ok(Json(state.service.status(&session, BookId::new(book_id))))
}

async fn transition(
    State(state): State<ShelfState>,
    Path(book_id): Path<String>,
    jar: CookieJar,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<ShelfView>, AppError> {
    let target: ShelfStatus = request.status.parse::<ShelfStatus>().map_err(|e| {
        AppError::validation(
            vec![json!({ "field": "status", "error": e.to_string() })],
            "status must be one of WANT_TO_READ, CURRENTLY_READING, READ",
        )
    })?;

    let session = state.sessions.resolve(&jar).await?;
    let view = state
        .service
        .transition(&session, BookId::new(book_id), target)
        .await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{reader, shelved, FakeBackend};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use bookworm_authz::SessionCookie;
    use bookworm_kernel::settings::AuthSettings;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(backend: Arc<FakeBackend>) -> Router {
        let sessions =
            SessionResolver::new(backend.clone(), SessionCookie::new(&AuthSettings::default()));
        router(ShelfState {
            sessions,
            service: ShelfService::new(backend),
        })
    }

    fn backend() -> Arc<FakeBackend> {
        let mut user = reader("u1");
        user.shelves.want_to_read = shelved(&["b1"]);
        user.shelves.read = shelved(&["b9"]);
        Arc::new(FakeBackend::new().with_user("t1", user))
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn put(path: &str, status: &str) -> Request<Body> {
        Request::put(path)
            .header(header::COOKIE, "token=t1")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "status": status }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn status_lists_the_next_controls() {
        let response = app(backend())
            .oneshot(
                Request::get("/b1")
                    .header(header::COOKIE, "token=t1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "WANT_TO_READ");
        assert_eq!(body["allowed_transitions"], json!(["CURRENTLY_READING"]));
        assert_eq!(body["tracked"], true);
    }

    #[tokio::test]
    async fn anonymous_status_offers_nothing() {
        let response = app(backend())
            .oneshot(Request::get("/b1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["status"], "NONE");
        assert_eq!(body["allowed_transitions"], json!([]));
        assert_eq!(body["tracked"], false);
    }

    #[tokio::test]
    async fn forward_transition_succeeds() {
        let backend = backend();
        let response = app(backend.clone())
            .oneshot(put("/b1", "CURRENTLY_READING"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "CURRENTLY_READING");
        assert_eq!(backend.shelves_of("t1").currently_reading, shelved(&["b1"]));
    }

    #[tokio::test]
    async fn finished_book_cannot_move() {
        let response = app(backend()).oneshot(put("/b9", "WANT_TO_READ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "invalid_transition");
        assert_eq!(body["error"]["details"][0]["from"], "READ");
    }

    #[tokio::test]
    async fn unknown_status_is_a_validation_error() {
        let response = app(backend()).oneshot(put("/b1", "FINISHED")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejected_write_is_a_bad_gateway() {
        let backend = backend();
        backend.reject_writes("Shelf service unavailable");

        let response = app(backend).oneshot(put("/b1", "CURRENTLY_READING")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "write_rejected");
    }

    #[tokio::test]
    async fn api_outage_is_a_bad_gateway_not_a_sign_in_prompt() {
        let backend = backend();
        backend.fail_reads();

        let response = app(backend).oneshot(put("/b1", "CURRENTLY_READING")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "upstream_unavailable");
    }

    #[tokio::test]
    async fn library_requires_a_session() {
        let response = app(backend())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(backend())
            .oneshot(
                Request::get("/")
                    .header(header::COOKIE, "token=t1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["want_to_read"][0]["id"], "b1");
        assert_eq!(body["read"][0]["id"], "b9");
    }
}
