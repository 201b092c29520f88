use serde::Serialize;
use std::num::IntErrorKind;

/// One page of a listing plus what the view needs for prev/next controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Number of pages for `total_count` items, never less than one.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_count.div_ceil(page_size).max(1)
}

/// Interprets the raw `page` query value. Missing, non-numeric, zero and
/// negative values become page 1; numbers too large for the integer type
/// saturate so they clamp to the last page later.
pub fn parse_page_param(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return 1;
    };

    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => usize::try_from(n).unwrap_or(usize::MAX),
        Ok(_) => 1,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => usize::MAX,
        Err(_) => 1,
    }
}

/// Cuts the `requested` page out of `items`, clamping the page number into
/// `[1, total_pages]`.
pub fn paginate<T: Clone>(items: &[T], requested: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let current_page = requested.clamp(1, total_pages);

    let start = (current_page - 1) * page_size;
    let end = start.saturating_add(page_size).min(total_items);
    let items = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items,
        current_page,
        total_pages,
        total_items,
    }
}
