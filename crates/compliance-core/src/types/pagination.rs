//! Paging for processing log searches.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u64 = 25;
const MAX_PAGE_SIZE: u64 = 500;

/// One page of a search, 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    #[serde(default = "first_page")]
    pub page: u64,
    /// Rows per page, at most 500.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Build a request, pulling both values into their valid ranges.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// `LIMIT` bind value.
    pub fn limit(&self) -> i64 {
        to_bind(self.page_size)
    }

    /// `OFFSET` bind value. Pages past the representable range saturate to
    /// `i64::MAX` and simply come back empty.
    pub fn offset(&self) -> i64 {
        to_bind(self.page.saturating_sub(1).saturating_mul(self.page_size))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(first_page(), DEFAULT_PAGE_SIZE)
    }
}

/// A page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    /// Never zero; an empty result is one empty page.
    pub total_pages: u64,
    pub has_next: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Wrap `items` fetched for `request` out of `total_items` matches.
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.page_size).max(1);
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
        }
    }
}

fn to_bind(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn first_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let page = PageRequest::new(0, 10_000);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit(), MAX_PAGE_SIZE as i64);
        assert_eq!(page.offset(), 0);

        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        assert_eq!(PageRequest::new(u64::MAX, 50).offset(), i64::MAX);
        // Fits in u64 but not in i64.
        let past_i64 = (i64::MAX as u64) / 2 + 2;
        assert_eq!(PageRequest::new(past_i64, 2).offset(), i64::MAX);
    }

    #[test]
    fn test_page_response_totals() {
        let resp = PageResponse::new(vec![1, 2], &PageRequest::new(1, 2), 5);
        assert_eq!(resp.total_pages, 3);
        assert!(resp.has_next);

        let empty: PageResponse<u8> = PageResponse::new(Vec::new(), &PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
    }
}
