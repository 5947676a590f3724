//! Pagination utilities for songbook-api
//!
//! Listing pages are sliced by the repository; verse pages are sliced here
//! from the full verse sequence.

use std::ops::Range;

use songbook_common::db::PageRequest;

use crate::error::ApiResult;

/// Page size for `GET /songs` when `limit` is omitted
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Verses per page for `GET /songs/{id}/text` when `limit` is omitted
pub const DEFAULT_VERSE_LIMIT: i64 = 2;

/// Validate optional query values against their defaults
///
/// Runs before any storage call; out-of-range values become a 400.
pub fn page_request(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> ApiResult<PageRequest> {
    Ok(PageRequest::new(
        page.unwrap_or(1),
        limit.unwrap_or(default_limit),
    )?)
}

/// Total number of pages needed for `total_items` rows at `limit` per page
///
/// # Examples
/// ```
/// use songbook_api::pagination::total_pages;
///
/// assert_eq!(total_pages(250, 100), 3);
/// assert_eq!(total_pages(200, 100), 2);
/// assert_eq!(total_pages(0, 10), 0);
/// ```
pub fn total_pages(total_items: i64, limit: i64) -> i64 {
    if total_items <= 0 || limit <= 0 {
        return 0;
    }
    (total_items + limit - 1) / limit
}

/// Index range of the verses on the requested page
///
/// Both ends are clamped to `[0, total]`; a page past the end is empty.
pub fn verse_window(total: usize, page: PageRequest) -> Range<usize> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);

    let start = offset.min(total);
    let end = start.saturating_add(limit).min(total);
    start..end
}
