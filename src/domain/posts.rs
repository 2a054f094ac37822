//! Post display helpers and ordering.

use std::cmp::Ordering;

use crate::domain::entities::PostRecord;

/// Number of characters shown when a post is referred to by its text.
pub const SHORT_LABEL_CHARS: usize = 15;

/// Derive the display/log label for a post: the first [`SHORT_LABEL_CHARS`]
/// characters of its text. Character-based, so multibyte text never splits.
pub fn short_label(text: &str) -> String {
    text.chars().take(SHORT_LABEL_CHARS).collect()
}

/// Listing order: newest first, ties resolved by insertion order.
pub fn newest_first(a: &PostRecord, b: &PostRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.seq.cmp(&b.seq))
}
