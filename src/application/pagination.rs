//! Fixed-size page slicing with clamping.

use serde::Serialize;

/// Page size used by every public listing.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A 1-based page selector. Construction clamps rather than fails: anything
/// unparsable or below 1 becomes page 1; clamping against the upper bound
/// happens in [`paginate`] once the sequence length is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNumber(usize);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn new(number: usize) -> Self {
        Self(number.max(1))
    }

    /// Parse a raw query value. Missing, non-numeric, zero, and negative
    /// inputs all select the first page.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|parsed| *parsed >= 1)
                .map(|parsed| Self(parsed as usize))
                .unwrap_or(Self::FIRST),
            None => Self::FIRST,
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Slice an ordered sequence into the requested page.
///
/// Out-of-range requests clamp to the nearest valid page. An empty sequence
/// yields exactly one empty page, so `total_pages` is never zero.
pub fn paginate<T>(items: Vec<T>, page_size: usize, requested: PageNumber) -> Paginated<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let number = requested.get().min(total_pages);

    let start = (number - 1) * page_size;
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect();

    Paginated {
        items,
        number,
        total_pages,
        total_items,
        has_prev: number > 1,
        has_next: number < total_pages,
    }
}
