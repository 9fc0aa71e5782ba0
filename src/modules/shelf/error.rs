//! Error types for shelf operations.

use bookworm_http::AppError;
use serde_json::json;
use thiserror::Error;

use super::status::ShelfStatus;
use crate::backend::BackendError;
use crate::modules::books::models::BookId;

/// Errors a shelf request can end with. None of them are fatal; the book's
/// status simply stays where it was.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// The requested status is not reachable from the current one.
    #[error("cannot move book {book_id} from {from} to {to}")]
    InvalidTransition {
        book_id: BookId,
        from: ShelfStatus,
        to: ShelfStatus,
    },

    /// No session; the caller belongs on the login page.
    #[error("sign in to manage your shelves")]
    Unauthenticated,

    /// The API refused the write. Safe to retry by hand.
    #[error("shelf update was rejected: {0}")]
    WriteRejected(String),

    /// Another transition for the same book is still waiting on the API.
    #[error("a shelf update for book {0} is already in progress")]
    TransitionInFlight(BookId),

    /// Reading the current snapshot failed.
    #[error("could not load shelves: {0}")]
    Backend(#[from] BackendError),
}

impl From<ShelfError> for AppError {
    fn from(err: ShelfError) -> Self {
        let message = err.to_string();
        match err {
            ShelfError::InvalidTransition { book_id, from, to } => AppError::conflict(
                "invalid_transition",
                vec![json!({ "book_id": book_id, "from": from, "to": to })],
                message,
            ),
            ShelfError::Unauthenticated => AppError::unauthorized(message),
            ShelfError::WriteRejected(_) => AppError::bad_gateway("write_rejected", message),
            ShelfError::TransitionInFlight(book_id) => AppError::conflict(
                "transition_in_flight",
                vec![json!({ "book_id": book_id })],
                message,
            ),
            ShelfError::Backend(_) => AppError::bad_gateway("upstream_unavailable", message),
        }
    }
}
