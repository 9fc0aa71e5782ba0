use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque book identifier, passed to the API verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A catalog book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book
    pub id: BookId,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Cover image URL on an allowed image host
    pub cover: Option<String>,
    pub genre: Option<String>,
    /// Average community rating
    pub rating: Option<f32>,
}

/// A book as it appears on a shelf: always an id, details only when the API populated them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRef {
    pub id: BookId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl BookRef {
    /// A reference carrying nothing but the id.
    pub fn bare(id: BookId) -> Self {
        Self {
            id,
            title: None,
            author: None,
            cover: None,
            genre: None,
            rating: None,
        }
    }
}

/// Catalog filters accepted by `GET /api/books`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Genre to keep; `All` or absent keeps every genre
    pub genre: Option<String>,
    /// Case-insensitive search over title and author
    pub q: Option<String>,
}
