//! Limit/offset and page-number pagination helpers.

use serde::Serialize;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Highest page number accepted; larger requests resolve to this page.
pub const MAX_PAGE: i64 = 1_000_000;

/// A resolved 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Resolve optional `page` / `page_size` query values.
    ///
    /// `page` is clamped to `1..=MAX_PAGE`; `page_size` to `1..=max_size`.
    pub fn new(
        page: Option<i64>,
        page_size: Option<i64>,
        default_size: i64,
        max_size: i64,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            page_size: clamp_limit(page_size, default_size, max_size),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Row limit for this page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// Number of pages needed to show `total` rows (at least 1).
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 1;
    }
    (total + page_size - 1) / page_size
}

/// A page of results with the metadata a paginated view needs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: total_pages(total, request.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 50, 100), 50);
    }

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(Some(1000), 50, 100), 100);
        assert_eq!(clamp_limit(Some(0), 50, 100), 1);
        assert_eq!(clamp_limit(Some(25), 50, 100), 25);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(Some(-5)), 0);
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(30)), 30);
    }

    #[test]
    fn page_request_offsets() {
        let req = PageRequest::new(Some(3), Some(20), 50, 100);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);

        let first = PageRequest::new(Some(0), None, 50, 100);
        assert_eq!(first.page, 1);
        assert_eq!(first.offset(), 0);
        assert_eq!(first.page_size, 50);
    }

    #[test]
    fn huge_page_numbers_are_clamped() {
        let req = PageRequest::new(Some(i64::MAX), Some(50), 50, 100);
        assert_eq!(req.page, MAX_PAGE);
        assert_eq!(req.offset(), (MAX_PAGE - 1) * 50);

        let raw = PageRequest {
            page: i64::MAX,
            page_size: 100,
        };
        assert_eq!(raw.offset(), i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 50), 1);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
    }

    #[test]
    fn page_carries_request_metadata() {
        let req = PageRequest::new(Some(2), Some(10), 50, 100);
        let page = Page::new(vec![1, 2, 3], 13, req);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 3);
    }
}
