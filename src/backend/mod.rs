//! The external Bookworm API: the only source of truth for books, users and shelves.

pub mod http;
pub mod schema;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use bookworm_http::AppError;
use thiserror::Error;

use crate::modules::books::models::{Book, BookId};
use crate::modules::shelf::status::ShelfStatus;
use crate::modules::users::User;

pub use http::HttpBackend;
pub use schema::Normalizer;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to the Bookworm API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Bookworm API answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected payload from the Bookworm API: {0}")]
    Decode(String),
}

impl BackendError {
    /// The human-readable reason, without the transport framing.
    pub fn reason(&self) -> String {
        match self {
            BackendError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::bad_gateway("upstream_unavailable", err.to_string())
    }
}

/// Read and write boundary to the Bookworm API.
///
/// Every payload is normalized into canonical entities before it leaves an
/// implementation.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// The user owning `token`, with their shelves. `None` when the API does not recognise the session.
    async fn current_user(&self, token: &str) -> Result<Option<User>, BackendError>;

    async fn list_books(&self) -> Result<Vec<Book>, BackendError>;

    async fn get_book(&self, id: &BookId) -> Result<Option<Book>, BackendError>;

    /// Put `book_id` on the `status` shelf for the session's user.
    async fn update_shelf(
        &self,
        token: &str,
        book_id: &BookId,
        status: ShelfStatus,
    ) -> Result<(), BackendError>;
}
