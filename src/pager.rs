//! Pure paging computation over a result set
//!
//! Paging is a pure function of `(result_set, page_index, page_size)` with no
//! stored state of its own; the session holds the page index and this module
//! computes the visible window.

use crate::error::{Error, Result};
use crate::types::{CandidateItem, ResultSet};

/// The visible window of a result set at one page position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView<'a> {
    /// Items visible on this page, in result-set order
    pub items: &'a [CandidateItem],
    /// 0-based absolute index of the first visible item
    pub start_index: usize,
    /// Whether a previous page exists
    pub has_previous: bool,
    /// Whether a next page exists
    pub has_next: bool,
}

impl PageView<'_> {
    /// 1-based absolute index of the last item on this page
    ///
    /// The selection grammar treats `last_absolute_index() + 1` as the
    /// next-page shortcut when more pages exist.
    pub fn last_absolute_index(&self) -> usize {
        self.start_index + self.items.len()
    }
}

/// Compute the page view at `page_index`
///
/// Returns [`Error::PageOutOfRange`] when the page starts past the end of
/// the result set, and [`Error::Config`] when `page_size` is zero.
pub fn page(result_set: &ResultSet, page_index: usize, page_size: usize) -> Result<PageView<'_>> {
    if page_size == 0 {
        return Err(Error::Config {
            message: "page_size must be at least 1".to_string(),
            key: Some("page_size".to_string()),
        });
    }

    let total = result_set.len();
    let start = page_index * page_size;
    if start >= total {
        return Err(Error::PageOutOfRange {
            page: page_index,
            pages: total.div_ceil(page_size),
        });
    }

    let end = (start + page_size).min(total);
    Ok(PageView {
        items: &result_set.items[start..end],
        start_index: start,
        has_previous: page_index > 0,
        has_next: end < total,
    })
}
