//! Busy flags for outstanding shelf writes, keyed by (user, book).

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::modules::books::models::BookId;

type Key = (String, BookId);

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<Key>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> MutexGuard<'_, HashSet<Key>> {
        // A poisoned lock still guards a valid set.
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the flag, or `None` if a write for this book is already outstanding.
    pub fn try_acquire(&self, user_id: &str, book_id: &BookId) -> Option<InFlightGuard> {
        let key = (user_id.to_string(), book_id.clone());
        if !self.keys().insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    pub fn is_busy(&self, user_id: &str, book_id: &BookId) -> bool {
        self.keys()
            .contains(&(user_id.to_string(), book_id.clone()))
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its flag on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<Key>>>,
    key: Key,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
