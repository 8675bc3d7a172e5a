//! Fixed-size, 1-indexed pagination over ordered collections.
//!
//! Out-of-range page numbers never fail: anything past the last page (or
//! below the first) resolves to the last page, and a missing or unparsable
//! page parameter resolves to the first page. An empty collection still has
//! one empty page.

use std::num::NonZeroUsize;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid configuration: page size must be positive, got {0}")]
    NonPositivePageSize(i64),
}

/// Page number as requested by a client, before it is clamped to the
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    #[default]
    First,
    Number(i64),
}

impl PageRequest {
    /// Integers too large for `i64` saturate, so they still land on the
    /// last page instead of being treated as garbage.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(str::trim) else {
            return PageRequest::First;
        };
        if let Ok(number) = value.parse::<i64>() {
            return PageRequest::Number(number);
        }
        let (negative, digits) = match value.as_bytes().first() {
            Some(b'-') => (true, &value[1..]),
            Some(b'+') => (false, &value[1..]),
            _ => (false, value),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return PageRequest::First;
        }
        PageRequest::Number(if negative { i64::MIN } else { i64::MAX })
    }
}

/// The slice of a collection that a resolved page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    pub fn meta(&self) -> PageMeta {
        let has_next = self.number < self.total_pages;
        let has_previous = self.number > 1;
        PageMeta {
            number: self.number,
            per_page: self.per_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            has_next,
            has_previous,
            next_page: has_next.then_some(self.number + 1),
            previous_page: has_previous.then(|| self.number - 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub number: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page: Option<usize>,
    pub previous_page: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn from_window(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            meta: window.meta(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: NonZeroUsize,
}

impl Paginator {
    pub fn new(per_page: i64) -> Result<Self, PaginationError> {
        usize::try_from(per_page)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(|per_page| Self { per_page })
            .ok_or(PaginationError::NonPositivePageSize(per_page))
    }

    pub fn per_page(&self) -> usize {
        self.per_page.get()
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.per_page()).max(1)
    }

    pub fn window(&self, total_items: usize, request: PageRequest) -> PageWindow {
        let per_page = self.per_page();
        let total_pages = self.total_pages(total_items);
        let number = match request {
            PageRequest::First => 1,
            PageRequest::Number(n) => usize::try_from(n)
                .ok()
                .filter(|n| (1..=total_pages).contains(n))
                .unwrap_or(total_pages),
        };
        let offset = (number - 1) * per_page;
        let limit = per_page.min(total_items.saturating_sub(offset));

        PageWindow {
            number,
            per_page,
            total_pages,
            total_items,
            offset,
            limit,
        }
    }

    pub fn paginate<T>(&self, items: Vec<T>, request: PageRequest) -> Page<T> {
        let window = self.window(items.len(), request);
        let items = items
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();
        Page::from_window(items, window)
    }
}
