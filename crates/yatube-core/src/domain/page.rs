//! Page-number pagination for post listings.

use serde::Serialize;

/// A requested page: 1-based number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(number: u64, per_page: u64) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Parse a raw `?page=` value. Anything that is not a positive integer means page 1.
    /// Integers too large for `u64` saturate, so they land on the last page.
    pub fn parse(raw: Option<&str>, per_page: u64) -> Self {
        let number = raw.map(str::trim).map_or(1, |s| match s.parse::<u64>() {
            Ok(n) => n,
            Err(_) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => u64::MAX,
            Err(_) => 1,
        });
        Self::new(number, per_page)
    }

    /// The page actually served for `total` items: requests past the end get the last page.
    pub fn resolve(&self, total: u64) -> u64 {
        self.number.min(num_pages(total, self.per_page))
    }

    /// Offset of the first item on a resolved page number.
    pub fn offset(&self, number: u64) -> u64 {
        (number - 1) * self.per_page
    }
}

/// An empty list still has one (empty) page.
fn num_pages(total: u64, per_page: u64) -> u64 {
    if total == 0 {
        1
    } else {
        total.div_ceil(per_page)
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, per_page: u64, total: u64) -> Self {
        Self {
            items,
            number,
            per_page,
            total,
        }
    }

    pub fn num_pages(&self) -> u64 {
        num_pages(self.total, self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total: self.total,
        }
    }
}
