//! In-memory `BackendApi` for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{BackendApi, BackendError};
use crate::modules::books::models::{Book, BookId, BookRef};
use crate::modules::shelf::status::{derive_status, ShelfCollections, ShelfIntent, ShelfStatus};
use crate::modules::users::{Role, User};

/// Pauses `update_shelf` until released, so tests can hold a write open.
#[derive(Default)]
pub struct WriteLatch {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct FakeBackend {
    users: Mutex<HashMap<String, User>>,
    books: Mutex<Vec<Book>>,
    reject_writes: Mutex<Option<String>>,
    fail_reads: Mutex<bool>,
    writes: Mutex<Vec<(BookId, ShelfStatus)>>,
    latch: Mutex<Option<Arc<WriteLatch>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: &str, user: User) -> Self {
        self.users.lock().unwrap().insert(token.to_string(), user);
        self
    }

    pub fn with_books(self, books: Vec<Book>) -> Self {
        *self.books.lock().unwrap() = books;
        self
    }

    pub fn reject_writes(&self, reason: &str) {
        *self.reject_writes.lock().unwrap() = Some(reason.to_string());
    }

    /// Make every read answer as if the API were down.
    pub fn fail_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }

    fn read_outage(&self) -> Result<(), BackendError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(BackendError::Status {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }

    pub fn hold_writes(&self) -> Arc<WriteLatch> {
        let latch = Arc::new(WriteLatch::default());
        *self.latch.lock().unwrap() = Some(Arc::clone(&latch));
        latch
    }

    pub fn writes(&self) -> Vec<(BookId, ShelfStatus)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn shelves_of(&self, token: &str) -> ShelfCollections {
        self.users.lock().unwrap()[token].shelves.clone()
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn current_user(&self, token: &str) -> Result<Option<User>, BackendError> {
        self.read_outage()?;
        Ok(self.users.lock().unwrap().get(token).cloned())
    }

    async fn list_books(&self) -> Result<Vec<Book>, BackendError> {
        self.read_outage()?;
        Ok(self.books.lock().unwrap().clone())
    }

    async fn get_book(&self, id: &BookId) -> Result<Option<Book>, BackendError> {
        self.read_outage()?;
        Ok(self
            .books
            .lock()
            .unwrap()
            .iter()
            .find(|b| &b.id == id)
            .cloned())
    }

    async fn update_shelf(
        &self,
        token: &str,
        book_id: &BookId,
        status: ShelfStatus,
    ) -> Result<(), BackendError> {
        let latch = self.latch.lock().unwrap().clone();
        if let Some(latch) = latch {
            latch.entered.notify_one();
            latch.release.notified().await;
        }

        if let Some(reason) = self.reject_writes.lock().unwrap().clone() {
            return Err(BackendError::Status {
                status: 400,
                message: reason,
            });
        }

        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(token).ok_or(BackendError::Status {
            status: 401,
            message: "Unauthorized".to_string(),
        })?;
        let intent = ShelfIntent {
            book_id: book_id.clone(),
            from: derive_status(book_id, &user.shelves),
            to: status,
        };
        user.shelves.apply(&intent);
        self.writes.lock().unwrap().push((book_id.clone(), status));
        Ok(())
    }
}

pub fn reader(id: &str) -> User {
    User {
        id: id.to_string(),
        name: "Sarah Johnson".to_string(),
        email: "sarah@example.com".to_string(),
        photo: None,
        role: Role::User,
        shelves: ShelfCollections::default(),
    }
}

pub fn book(id: &str, title: &str, author: &str, genre: &str) -> Book {
    Book {
        id: BookId::from(id),
        title: title.to_string(),
        author: author.to_string(),
        cover: None,
        genre: Some(genre.to_string()),
        rating: Some(4.5),
    }
}

pub fn shelved(ids: &[&str]) -> Vec<BookRef> {
    ids.iter().map(|id| BookRef::bare(BookId::from(*id))).collect()
}
