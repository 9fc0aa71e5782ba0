//! `reqwest` client for the Bookworm API.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

use super::schema::{BookListPayload, BookPayload, Normalizer, UserPayload};
use super::{BackendApi, BackendError};
use crate::modules::books::models::{Book, BookId};
use crate::modules::shelf::status::ShelfStatus;
use crate::modules::users::User;
use bookworm_kernel::settings::Settings;

pub struct HttpBackend {
    client: Client,
    base_url: Url,
    cookie_name: String,
    normalizer: Normalizer,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShelfUpdate<'a> {
    book_id: &'a BookId,
    status: ShelfStatus,
}

impl HttpBackend {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.backend.request_timeout_ms))
            .build()
            .context("failed to build Bookworm API client")?;

        let base_url = Url::parse(&settings.backend.base_url).with_context(|| {
            format!("invalid Bookworm API base url '{}'", settings.backend.base_url)
        })?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Bookworm API base url '{}' cannot carry a path", base_url);
        }

        Ok(Self {
            client,
            base_url,
            cookie_name: settings.auth.cookie_name.clone(),
            normalizer: Normalizer::new(settings.media.allowed_image_hosts.clone()),
        })
    }

    /// Endpoint under the base url. Each segment is percent-encoded, so ids stay opaque.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn session_cookie(&self, token: &str) -> String {
        format!("{}={}", self.cookie_name, token)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Turn a non-success response into an error, preferring the API's own `message`.
    async fn failure(response: Response) -> BackendError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());

        BackendError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn current_user(&self, token: &str) -> Result<Option<User>, BackendError> {
        let response = self
            .client
            .get(self.url(&["me"]))
            .header(header::COOKIE, self.session_cookie(token))
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Self::failure(response).await);
        }
        if !status.is_success() {
            tracing::debug!(%status, "session not recognised by the API");
            return Ok(None);
        }

        let payload: UserPayload = Self::decode(response).await?;
        self.normalizer.user(payload.into_raw()).map(Some)
    }

    async fn list_books(&self) -> Result<Vec<Book>, BackendError> {
        let response = self.client.get(self.url(&["books"])).send().await?;
        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        let payload: BookListPayload = Self::decode(response).await?;
        Ok(self.normalizer.books(payload.into_raw()))
    }

    async fn get_book(&self, id: &BookId) -> Result<Option<Book>, BackendError> {
        // Dot segments would be dropped from the path rather than encoded.
        if matches!(id.as_str(), "" | "." | "..") {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.url(&["books", id.as_str()]))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => return Err(Self::failure(response).await),
            _ => {}
        }

        let payload: BookPayload = Self::decode(response).await?;
        Ok(self.normalizer.book(payload.into_raw()))
    }

    async fn update_shelf(
        &self,
        token: &str,
        book_id: &BookId,
        status: ShelfStatus,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .patch(self.url(&["shelf"]))
            .header(header::COOKIE, self.session_cookie(token))
            .json(&ShelfUpdate { book_id, status })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::failure(response).await)
        }
    }
}
