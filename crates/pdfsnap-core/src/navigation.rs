//! Page navigation: bounded 1-based page numbers, numeric input parsing and
//! the per-page button strip.

use std::fmt;

use serde::Serialize;

/// A 1-based page number known to be within `[1, page_count]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PageNumber(u32);

impl PageNumber {
    /// The first page.
    pub const FIRST: PageNumber = PageNumber(1);

    /// Validate `number` against a document with `page_count` pages.
    pub fn new(number: u32, page_count: u32) -> Option<Self> {
        (1..=page_count).contains(&number).then_some(Self(number))
    }

    /// The page number as an integer.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse the numeric page input.
///
/// Leading whitespace and a sign are accepted and parsing stops at the first
/// non-digit, so `"3"`, `" 3"` and `"3.9"` all mean page 3. Anything that is
/// not a page of the document yields `None`.
pub fn parse_page_input(text: &str, page_count: u32) -> Option<PageNumber> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() || negative {
        return None;
    }

    let number = digits.parse::<u32>().ok()?;
    PageNumber::new(number, page_count)
}

/// One entry of the pagination strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageButton {
    /// Page the button navigates to.
    pub number: u32,
    /// Whether this is the current page.
    pub selected: bool,
}

/// Buttons for every page of a document, marking the current one.
pub fn page_buttons(page_count: u32, current: u32) -> Vec<PageButton> {
    (1..=page_count)
        .map(|number| PageButton {
            number,
            selected: number == current,
        })
        .collect()
}
