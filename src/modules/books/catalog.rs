//! Catalog filtering for the browse screen.

use std::collections::BTreeSet;

use super::models::{Book, CatalogQuery};
use crate::utils::contains_ignore_case;

/// The genre option that disables genre filtering.
pub const ALL_GENRES: &str = "All";

impl CatalogQuery {
    fn genre_filter(&self) -> Option<&str> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != ALL_GENRES)
    }

    pub fn matches(&self, book: &Book) -> bool {
        let genre_ok = match self.genre_filter() {
            None => true,
            Some(genre) => book.genre.as_deref() == Some(genre),
        };
        let text_ok = match self.q.as_deref() {
            None => true,
            Some(q) => contains_ignore_case(&book.title, q) || contains_ignore_case(&book.author, q),
        };
        genre_ok && text_ok
    }
}

/// Keep the books matching `query`, in catalog order.
pub fn filter(books: Vec<Book>, query: &CatalogQuery) -> Vec<Book> {
    books.into_iter().filter(|b| query.matches(b)).collect()
}

/// Distinct genres, sorted, with `All` first.
pub fn genres(books: &[Book]) -> Vec<String> {
    let distinct: BTreeSet<&str> = books
        .iter()
        .filter_map(|b| b.genre.as_deref())
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != ALL_GENRES)
        .collect();

    std::iter::once(ALL_GENRES)
        .chain(distinct)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::book;

    fn catalog() -> Vec<Book> {
        vec![
            book("1", "The Midnight Library", "Matt Haig", "Fiction"),
            book("2", "Dune", "Frank Herbert", "Science Fiction"),
            book("3", "Atomic Habits", "James Clear", "Self-Help"),
            book("4", "Project Hail Mary", "Andy Weir", "Science Fiction"),
        ]
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    fn query(genre: Option<&str>, q: Option<&str>) -> CatalogQuery {
        CatalogQuery {
            genre: genre.map(str::to_string),
            q: q.map(str::to_string),
        }
    }

    #[test]
    fn no_filters_keep_everything() {
        assert_eq!(ids(&filter(catalog(), &CatalogQuery::default())), ["1", "2", "3", "4"]);
        assert_eq!(ids(&filter(catalog(), &query(Some("All"), None))).len(), 4);
    }

    #[test]
    fn genre_is_an_exact_match() {
        let books = filter(catalog(), &query(Some("Science Fiction"), None));
        assert_eq!(ids(&books), ["2", "4"]);

        assert!(filter(catalog(), &query(Some("Fict"), None)).is_empty());
    }

    #[test]
    fn search_covers_title_and_author() {
        assert_eq!(ids(&filter(catalog(), &query(None, Some("hail")))), ["4"]);
        assert_eq!(ids(&filter(catalog(), &query(None, Some("HERBERT")))), ["2"]);
    }

    #[test]
    fn genre_and_search_combine() {
        let books = filter(catalog(), &query(Some("Science Fiction"), Some("weir")));
        assert_eq!(ids(&books), ["4"]);
    }

    #[test]
    fn genres_are_distinct_sorted_and_led_by_all() {
        let mut books = catalog();
        books[0].genre = None;
        assert_eq!(genres(&books), ["All", "Science Fiction", "Self-Help"]);
    }

    #[test]
    fn empty_catalog_still_offers_all() {
        assert_eq!(genres(&[]), ["All"]);
    }
}
