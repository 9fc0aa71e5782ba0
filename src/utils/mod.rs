//! Small text helpers shared by the catalog.

/// Case-insensitive substring match. The needle is used as typed; an empty one matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
