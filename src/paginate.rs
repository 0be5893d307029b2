//! Page arithmetic for long listings

use serde::Serialize;

/// One page of a listing, with bounds into the underlying collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Clamped 0-based page index actually shown
    pub index: usize,
    /// First item on the page (inclusive)
    pub start_index: usize,
    /// One past the last item on the page
    pub end_index: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Page {
    /// Item index range for slicing
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }

    /// Slice the page out of `items`
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end_index.min(items.len());
        let start = self.start_index.min(end);
        &items[start..end]
    }

    /// Human page label, e.g. "3/12"
    pub fn label(&self) -> String {
        format!("{}/{}", self.index + 1, self.total_pages)
    }
}

/// Compute the page `page_index` of `total` items, `page_size` per page
///
/// There is always at least one page, and out-of-range indexes are
/// clamped to the last page. A `page_size` of 0 is treated as 1.
pub fn paginate(total: usize, page_size: usize, page_index: usize) -> Page {
    let page_size = page_size.max(1);
    let total_pages = total.div_ceil(page_size).max(1);
    let index = page_index.min(total_pages - 1);
    let start_index = index.saturating_mul(page_size).min(total);
    let end_index = start_index.saturating_add(page_size).min(total);

    Page {
        index,
        start_index,
        end_index,
        total_pages,
        has_prev: index > 0,
        has_next: index < total_pages - 1,
    }
}
