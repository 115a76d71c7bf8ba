//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use atelier_core::pagination::{clamp_limit, clamp_offset, PageRequest};
use serde::Deserialize;

/// Default and maximum `limit` for `skip`/`limit` listings.
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;

/// Default and maximum `page_size` for page-numbered listings.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Offset pagination parameters (`?skip=&limit=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` with the given default limit.
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        (
            clamp_limit(self.limit, default_limit, MAX_LIMIT),
            clamp_offset(self.skip),
        )
    }
}

/// Page-number pagination parameters (`?page=&page_size=`).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn resolve(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_limit_defaults_and_clamps() {
        assert_eq!(PaginationParams::default().resolve(50), (50, 0));
        let p = PaginationParams {
            skip: Some(-5),
            limit: Some(1_000),
        };
        assert_eq!(p.resolve(50), (MAX_LIMIT, 0));
    }

    #[test]
    fn page_params_compute_offset() {
        let p = PageParams {
            page: Some(3),
            page_size: Some(20),
        };
        let req = p.resolve();
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
        assert_eq!(PageParams::default().resolve().page_size, DEFAULT_PAGE_SIZE);
    }
}
