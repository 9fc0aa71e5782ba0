//! Shelf synchronization: the one place a shelf transition is written.

use std::sync::Arc;

use serde::Serialize;

use super::error::ShelfError;
use super::in_flight::InFlight;
use super::status::{
    allowed_transitions, derive_status, request_transition, ShelfCollections, ShelfStatus,
};
use crate::backend::BackendApi;
use crate::modules::books::models::{BookId, BookRef};
use crate::session::Session;

/// A book's shelf status and the controls to offer for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelfView {
    pub book_id: BookId,
    pub status: ShelfStatus,
    pub allowed_transitions: Vec<ShelfStatus>,
    /// False when there is no session to track shelves for.
    pub tracked: bool,
    /// True while a write for this book is outstanding.
    pub busy: bool,
}

impl ShelfView {
    pub fn untracked(book_id: BookId) -> Self {
        Self {
            book_id,
            status: ShelfStatus::None,
            allowed_transitions: Vec::new(),
            tracked: false,
            busy: false,
        }
    }

    pub fn of(book_id: BookId, collections: &ShelfCollections, busy: bool) -> Self {
        let status = derive_status(&book_id, collections);
        Self {
            book_id,
            status,
            allowed_transitions: allowed_transitions(status).to_vec(),
            tracked: true,
            busy,
        }
    }
}

/// The my-library screen: one list per tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryView {
    pub currently_reading: Vec<BookRef>,
    pub want_to_read: Vec<BookRef>,
    pub read: Vec<BookRef>,
}

impl From<ShelfCollections> for LibraryView {
    fn from(shelves: ShelfCollections) -> Self {
        Self {
            currently_reading: shelves.currently_reading,
            want_to_read: shelves.want_to_read,
            read: shelves.read,
        }
    }
}

#[derive(Clone)]
pub struct ShelfService {
    backend: Arc<dyn BackendApi>,
    in_flight: InFlight,
}

impl ShelfService {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self {
            backend,
            in_flight: InFlight::new(),
        }
    }

    pub fn status(&self, session: &Session, book_id: BookId) -> ShelfView {
        match session.user() {
            None => ShelfView::untracked(book_id),
            Some(user) => {
                let busy = self.in_flight.is_busy(&user.id, &book_id);
                ShelfView::of(book_id, &user.shelves, busy)
            }
        }
    }

    /// Writes still waiting on the API, across all users.
    pub fn pending_writes(&self) -> usize {
        self.in_flight.len()
    }

    pub fn library(&self, session: &Session) -> Result<LibraryView, ShelfError> {
        let user = session.user().ok_or(ShelfError::Unauthenticated)?;
        Ok(LibraryView::from(user.shelves.clone()))
    }

    /// Move `book_id` to `target` for the session's user.
    ///
    /// Validates against a snapshot fetched after the busy flag is taken, then
    /// performs the write. Local state only changes once the API accepts it.
    pub async fn transition(
        &self,
        session: &Session,
        book_id: BookId,
        target: ShelfStatus,
    ) -> Result<ShelfView, ShelfError> {
        let (Some(token), Some(user)) = (session.token(), session.user()) else {
            return Err(ShelfError::Unauthenticated);
        };

        let _guard = self
            .in_flight
            .try_acquire(&user.id, &book_id)
            .ok_or_else(|| ShelfError::TransitionInFlight(book_id.clone()))?;

        let snapshot = self
            .backend
            .current_user(token)
            .await?
            .ok_or(ShelfError::Unauthenticated)?;

        let intent = request_transition(&book_id, target, &snapshot.shelves)?;

        if let Err(e) = self.backend.update_shelf(token, &book_id, intent.to).await {
            tracing::warn!(
                user_id = %snapshot.id,
                book_id = %book_id,
                to = %intent.to,
                error = %e,
                "shelf write rejected"
            );
            return Err(ShelfError::WriteRejected(e.reason()));
        }

        let mut shelves = snapshot.shelves;
        shelves.apply(&intent);

        tracing::info!(
            user_id = %snapshot.id,
            book_id = %book_id,
            from = %intent.from,
            to = %intent.to,
            "shelf updated"
        );

        Ok(ShelfView::of(book_id, &shelves, false))
    }
}
