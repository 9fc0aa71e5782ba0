//! Raw API payloads and their normalization into canonical entities.
//!
//! The API is loose: ids arrive as `_id` or `id`, as strings or numbers; shelf
//! entries are either bare ids or populated book documents; keys come in
//! camelCase or snake_case and may be missing altogether. Nothing past this
//! module sees any of that.

use reqwest::Url;
use serde::Deserialize;

use super::BackendError;
use crate::modules::books::models::{Book, BookId, BookRef};
use crate::modules::shelf::status::ShelfCollections;
use crate::modules::users::{Role, User};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_book_id(self) -> Option<BookId> {
        match self {
            RawId::Text(text) if text.trim().is_empty() => None,
            RawId::Text(text) => Some(BookId::new(text.trim())),
            RawId::Number(number) => Some(BookId::new(number.to_string())),
        }
    }

    fn into_string(self) -> Option<String> {
        self.into_book_id().map(|id| id.as_str().to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawGenre {
    Name(String),
    Document { name: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBook {
    #[serde(default, alias = "_id")]
    pub id: Option<RawId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "coverImage", alias = "cover_image", alias = "image")]
    pub cover: Option<String>,
    #[serde(default)]
    pub genre: Option<RawGenre>,
    #[serde(default, alias = "averageRating", alias = "average_rating")]
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawShelfEntry {
    Id(RawId),
    Book(RawBook),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawShelves {
    #[serde(default, alias = "wantToRead")]
    pub want_to_read: Option<Vec<Option<RawShelfEntry>>>,
    #[serde(default, alias = "currentlyReading")]
    pub currently_reading: Option<Vec<Option<RawShelfEntry>>>,
    #[serde(default)]
    pub read: Option<Vec<Option<RawShelfEntry>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    #[serde(default, alias = "_id")]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "photoURL", alias = "photo_url", alias = "image")]
    pub photo: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Shelves at the top level of the user document.
    #[serde(flatten)]
    pub shelves: RawShelves,
    /// Shelves nested under a `shelves` key; wins over the top-level ones when present.
    #[serde(default, rename = "shelves")]
    pub nested_shelves: Option<RawShelves>,
}

/// `GET /me` answers either the user document or `{ "user": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserPayload {
    Wrapped { user: RawUser },
    Bare(RawUser),
}

/// `GET /books` answers either an array or `{ "books": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BookListPayload {
    Wrapped { books: Vec<RawBook> },
    Bare(Vec<RawBook>),
}

/// `GET /books/{id}` answers either the book or `{ "book": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BookPayload {
    Wrapped { book: RawBook },
    Bare(RawBook),
}

/// Turns raw payloads into canonical entities.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    allowed_image_hosts: Vec<String>,
}

impl Normalizer {
    /// `allowed_image_hosts` empty means any https host is accepted.
    pub fn new(allowed_image_hosts: Vec<String>) -> Self {
        Self {
            allowed_image_hosts: allowed_image_hosts
                .into_iter()
                .map(|host| host.trim().to_ascii_lowercase())
                .filter(|host| !host.is_empty())
                .collect(),
        }
    }

    /// Keep an image URL only if it is https on an allowed host.
    pub fn image_url(&self, raw: Option<String>) -> Option<String> {
        let raw = raw?;
        let url = Url::parse(raw.trim()).ok()?;
        if url.scheme() != "https" {
            return None;
        }
        let host = url.host_str()?.to_ascii_lowercase();
        if self.allowed_image_hosts.is_empty() || self.allowed_image_hosts.contains(&host) {
            Some(url.to_string())
        } else {
            tracing::debug!(%host, "dropping image on a host outside the allowlist");
            None
        }
    }

    /// A catalog book needs an id and a title; everything else is optional.
    pub fn book(&self, raw: RawBook) -> Option<Book> {
        let id = raw.id.and_then(RawId::into_book_id)?;
        let title = non_empty(raw.title)?;

        Some(Book {
            id,
            title,
            author: non_empty(raw.author).unwrap_or_else(|| "Unknown author".to_string()),
            cover: self.image_url(raw.cover),
            genre: raw.genre.and_then(genre_name),
            rating: raw.rating.filter(|r| r.is_finite()),
        })
    }

    pub fn books(&self, raw: Vec<RawBook>) -> Vec<Book> {
        let total = raw.len();
        let books: Vec<Book> = raw.into_iter().filter_map(|b| self.book(b)).collect();
        if books.len() < total {
            tracing::warn!(
                dropped = total - books.len(),
                "skipped catalog entries without an id or title"
            );
        }
        books
    }

    pub fn book_ref(&self, entry: RawShelfEntry) -> Option<BookRef> {
        match entry {
            RawShelfEntry::Id(id) => id.into_book_id().map(BookRef::bare),
            RawShelfEntry::Book(raw) => {
                let id = raw.id.and_then(RawId::into_book_id)?;
                Some(BookRef {
                    id,
                    title: non_empty(raw.title),
                    author: non_empty(raw.author),
                    cover: self.image_url(raw.cover),
                    genre: raw.genre.and_then(genre_name),
                    rating: raw.rating.filter(|r| r.is_finite()),
                })
            }
        }
    }

    fn shelf(&self, entries: Option<Vec<Option<RawShelfEntry>>>) -> Vec<BookRef> {
        entries
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(|entry| self.book_ref(entry))
            .collect()
    }

    /// Missing shelves are empty shelves.
    pub fn shelves(&self, raw: RawShelves) -> ShelfCollections {
        ShelfCollections {
            want_to_read: self.shelf(raw.want_to_read),
            currently_reading: self.shelf(raw.currently_reading),
            read: self.shelf(raw.read),
        }
    }

    pub fn user(&self, raw: RawUser) -> Result<User, BackendError> {
        let id = raw
            .id
            .and_then(RawId::into_string)
            .ok_or_else(|| BackendError::Decode("user without an id".to_string()))?;

        let shelves = self.shelves(raw.nested_shelves.unwrap_or(raw.shelves));

        Ok(User {
            id,
            name: non_empty(raw.name).unwrap_or_default(),
            email: non_empty(raw.email).unwrap_or_default(),
            photo: self.image_url(raw.photo),
            role: raw
                .role
                .as_deref()
                .map(Role::from_api)
                .unwrap_or_default(),
            shelves,
        })
    }
}

impl UserPayload {
    pub fn into_raw(self) -> RawUser {
        match self {
            UserPayload::Wrapped { user } | UserPayload::Bare(user) => user,
        }
    }
}

impl BookListPayload {
    pub fn into_raw(self) -> Vec<RawBook> {
        match self {
            BookListPayload::Wrapped { books } | BookListPayload::Bare(books) => books,
        }
    }
}

impl BookPayload {
    pub fn into_raw(self) -> RawBook {
        match self {
            BookPayload::Wrapped { book } | BookPayload::Bare(book) => book,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn genre_name(genre: RawGenre) -> Option<String> {
    match genre {
        RawGenre::Name(name) | RawGenre::Document { name } => non_empty(Some(name)),
    }
}
