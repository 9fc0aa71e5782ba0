//! Shelf status reconciliation.
//!
//! A book sits on at most one of three shelves. Statuses only move forward:
//!
//! ```text
//! NONE ──▶ WANT_TO_READ ──▶ CURRENTLY_READING ──▶ READ
//!   └──────────────────────────────▲
//! ```
//!
//! Everything here is a pure computation over a snapshot of the user's
//! collections; the write itself belongs to [`super::service::ShelfService`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ShelfError;
use crate::modules::books::models::{BookId, BookRef};

/// Which shelf, if any, holds a book for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShelfStatus {
    None,
    WantToRead,
    CurrentlyReading,
    Read,
}

impl ShelfStatus {
    pub const ALL: [ShelfStatus; 4] = [
        ShelfStatus::None,
        ShelfStatus::WantToRead,
        ShelfStatus::CurrentlyReading,
        ShelfStatus::Read,
    ];

    /// Wire name, as the API expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            ShelfStatus::None => "NONE",
            ShelfStatus::WantToRead => "WANT_TO_READ",
            ShelfStatus::CurrentlyReading => "CURRENTLY_READING",
            ShelfStatus::Read => "READ",
        }
    }

    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

impl fmt::Display for ShelfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShelfStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ShelfStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shelf status '{0}'")]
pub struct UnknownStatus(pub String);

/// A user's three shelves. Overlap may arrive from the API; it is never produced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShelfCollections {
    #[serde(default)]
    pub want_to_read: Vec<BookRef>,
    #[serde(default)]
    pub currently_reading: Vec<BookRef>,
    #[serde(default)]
    pub read: Vec<BookRef>,
}

impl ShelfCollections {
    pub fn shelf(&self, status: ShelfStatus) -> &[BookRef] {
        match status {
            ShelfStatus::None => &[],
            ShelfStatus::WantToRead => &self.want_to_read,
            ShelfStatus::CurrentlyReading => &self.currently_reading,
            ShelfStatus::Read => &self.read,
        }
    }

    fn shelf_mut(&mut self, status: ShelfStatus) -> Option<&mut Vec<BookRef>> {
        match status {
            ShelfStatus::None => None,
            ShelfStatus::WantToRead => Some(&mut self.want_to_read),
            ShelfStatus::CurrentlyReading => Some(&mut self.currently_reading),
            ShelfStatus::Read => Some(&mut self.read),
        }
    }

    pub fn contains(&self, status: ShelfStatus, book_id: &BookId) -> bool {
        self.shelf(status).iter().any(|entry| &entry.id == book_id)
    }

    /// Apply a validated intent locally.
    ///
    /// The book leaves every shelf holding it and is appended to the target shelf,
    /// keeping whatever display details the removed entry had.
    pub fn apply(&mut self, intent: &ShelfIntent) {
        let mut carried: Option<BookRef> = None;

        for status in PRIORITY {
            if let Some(shelf) = self.shelf_mut(status) {
                if let Some(pos) = shelf.iter().position(|entry| entry.id == intent.book_id) {
                    let removed = shelf.remove(pos);
                    carried.get_or_insert(removed);
                }
                shelf.retain(|entry| entry.id != intent.book_id);
            }
        }

        let entry = carried.unwrap_or_else(|| BookRef::bare(intent.book_id.clone()));
        if let Some(target) = self.shelf_mut(intent.to) {
            target.push(entry);
        }
    }
}

/// The single external write a transition needs, plus the local update it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelfIntent {
    pub book_id: BookId,
    pub from: ShelfStatus,
    pub to: ShelfStatus,
}

/// Membership check order. When inconsistent data puts a book on several
/// shelves, the more active reading state wins.
const PRIORITY: [ShelfStatus; 3] = [
    ShelfStatus::CurrentlyReading,
    ShelfStatus::WantToRead,
    ShelfStatus::Read,
];

/// The shelf currently holding `book_id`.
pub fn derive_status(book_id: &BookId, collections: &ShelfCollections) -> ShelfStatus {
    PRIORITY
        .into_iter()
        .find(|&status| collections.contains(status, book_id))
        .unwrap_or(ShelfStatus::None)
}

/// Legal next statuses, in the order their controls are offered.
pub fn allowed_transitions(current: ShelfStatus) -> &'static [ShelfStatus] {
    match current {
        ShelfStatus::None => &[ShelfStatus::WantToRead, ShelfStatus::CurrentlyReading],
        ShelfStatus::WantToRead => &[ShelfStatus::CurrentlyReading],
        ShelfStatus::CurrentlyReading => &[ShelfStatus::Read],
        ShelfStatus::Read => &[],
    }
}

/// Validate a requested move against the snapshot and describe the write to perform.
pub fn request_transition(
    book_id: &BookId,
    target: ShelfStatus,
    collections: &ShelfCollections,
) -> Result<ShelfIntent, ShelfError> {
    let from = derive_status(book_id, collections);

    if !allowed_transitions(from).contains(&target) {
        return Err(ShelfError::InvalidTransition {
            book_id: book_id.clone(),
            from,
            to: target,
        });
    }

    Ok(ShelfIntent {
        book_id: book_id.clone(),
        from,
        to: target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(ids: &[&str]) -> Vec<BookRef> {
        ids.iter().map(|id| BookRef::bare(BookId::from(*id))).collect()
    }

    fn collections(want: &[&str], reading: &[&str], read: &[&str]) -> ShelfCollections {
        ShelfCollections {
            want_to_read: refs(want),
            currently_reading: refs(reading),
            read: refs(read),
        }
    }

    fn id(value: &str) -> BookId {
        BookId::from(value)
    }

    #[test]
    fn absent_book_has_no_status() {
        let shelves = collections(&["a"], &["b"], &["c"]);
        assert_eq!(derive_status(&id("z"), &shelves), ShelfStatus::None);
        assert_eq!(
            derive_status(&id("z"), &ShelfCollections::default()),
            ShelfStatus::None
        );
    }

    #[test]
    fn each_shelf_is_recognised() {
        let shelves = collections(&["w1", "w2"], &["c1"], &["r1", "r2", "r3"]);
        assert_eq!(derive_status(&id("w2"), &shelves), ShelfStatus::WantToRead);
        assert_eq!(derive_status(&id("c1"), &shelves), ShelfStatus::CurrentlyReading);
        assert_eq!(derive_status(&id("r3"), &shelves), ShelfStatus::Read);
    }

    #[test]
    fn currently_reading_wins_whatever_the_other_shelves_hold() {
        for (want, read) in [
            (vec![], vec![]),
            (vec!["x", "y"], vec![]),
            (vec![], vec!["y", "x"]),
            (vec!["q"], vec!["r", "s"]),
        ] {
            let shelves = collections(&want, &["book"], &read);
            assert_eq!(
                derive_status(&id("book"), &shelves),
                ShelfStatus::CurrentlyReading
            );
        }
    }

    #[test]
    fn overlapping_shelves_prefer_the_more_active_state() {
        let shelves = collections(&["b"], &["b"], &["b"]);
        assert_eq!(derive_status(&id("b"), &shelves), ShelfStatus::CurrentlyReading);

        let shelves = collections(&["b"], &[], &["b"]);
        assert_eq!(derive_status(&id("b"), &shelves), ShelfStatus::WantToRead);
    }

    #[test]
    fn derive_status_is_stable() {
        let shelves = collections(&["a"], &["a", "b"], &["c"]);
        for book in ["a", "b", "c", "d"] {
            let first = derive_status(&id(book), &shelves);
            let second = derive_status(&id(book), &shelves);
            assert_eq!(first, second);
            assert!(ShelfStatus::ALL.contains(&first));
        }
    }

    #[test]
    fn transitions_only_move_forward() {
        assert_eq!(
            allowed_transitions(ShelfStatus::None),
            &[ShelfStatus::WantToRead, ShelfStatus::CurrentlyReading]
        );
        assert_eq!(
            allowed_transitions(ShelfStatus::WantToRead),
            &[ShelfStatus::CurrentlyReading]
        );
        assert_eq!(
            allowed_transitions(ShelfStatus::CurrentlyReading),
            &[ShelfStatus::Read]
        );
        assert!(allowed_transitions(ShelfStatus::Read).is_empty());
        assert!(ShelfStatus::Read.is_terminal());

        for status in ShelfStatus::ALL {
            assert!(!allowed_transitions(status).contains(&ShelfStatus::None));
            assert!(!allowed_transitions(status).contains(&status));
        }
    }

    #[test]
    fn unshelved_book_can_start_reading_directly() {
        let mut shelves = collections(&["a"], &[], &["c"]);
        let intent = request_transition(&id("new"), ShelfStatus::CurrentlyReading, &shelves)
            .unwrap();

        assert_eq!(intent.from, ShelfStatus::None);
        assert_eq!(intent.to, ShelfStatus::CurrentlyReading);

        shelves.apply(&intent);
        assert_eq!(shelves.currently_reading, refs(&["new"]));
        assert_eq!(derive_status(&id("new"), &shelves), ShelfStatus::CurrentlyReading);
    }

    #[test]
    fn backward_move_is_rejected() {
        let shelves = collections(&[], &["b"], &[]);
        let err = request_transition(&id("b"), ShelfStatus::WantToRead, &shelves).unwrap_err();

        assert!(matches!(
            err,
            ShelfError::InvalidTransition {
                ref book_id,
                from: ShelfStatus::CurrentlyReading,
                to: ShelfStatus::WantToRead,
            } if *book_id == id("b")
        ));
    }

    #[test]
    fn finished_books_accept_nothing() {
        let shelves = collections(&[], &[], &["done"]);
        for target in ShelfStatus::ALL {
            assert!(request_transition(&id("done"), target, &shelves).is_err());
        }
    }

    #[test]
    fn apply_moves_the_entry_and_keeps_its_details() {
        let mut shelves = collections(&["a", "b"], &["c"], &[]);
        shelves.want_to_read[1].title = Some("Dune".to_string());

        let intent = request_transition(&id("b"), ShelfStatus::CurrentlyReading, &shelves)
            .unwrap();
        shelves.apply(&intent);

        assert_eq!(shelves.want_to_read, refs(&["a"]));
        assert_eq!(shelves.currently_reading.len(), 2);
        assert_eq!(shelves.currently_reading[1].id, id("b"));
        assert_eq!(shelves.currently_reading[1].title.as_deref(), Some("Dune"));
    }

    #[test]
    fn apply_clears_inconsistent_duplicates() {
        let mut shelves = collections(&["b", "b"], &["b"], &["x"]);
        let intent = request_transition(&id("b"), ShelfStatus::Read, &shelves).unwrap();
        shelves.apply(&intent);

        assert!(shelves.want_to_read.is_empty());
        assert!(shelves.currently_reading.is_empty());
        assert_eq!(shelves.read, refs(&["x", "b"]));

        let holders = ShelfStatus::ALL
            .into_iter()
            .filter(|&s| shelves.contains(s, &id("b")))
            .count();
        assert_eq!(holders, 1);
    }

    #[test]
    fn status_wire_names_round_trip() {
        for status in ShelfStatus::ALL {
            assert_eq!(status.as_str().parse::<ShelfStatus>(), Ok(status));
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::json!(status.as_str())
            );
        }
        assert!("want_to_read".parse::<ShelfStatus>().is_err());
    }
}
