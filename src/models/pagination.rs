// src/models/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;

pub const PUBLIC_PAGE_LIMIT: u32 = 50;
pub const ADMIN_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

// 1-indexed page request, already validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn from_query(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        // Oversized limits are capped rather than refused
        let limit = limit.unwrap_or(default_limit).min(MAX_PAGE_LIMIT);

        if page == 0 {
            return Err(AppError::InvalidQuery("page must be 1 or greater".into()));
        }
        if limit == 0 {
            return Err(AppError::InvalidQuery("limit must be 1 or greater".into()));
        }

        Ok(Self { page, limit })
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    // Values for LIMIT/OFFSET binds
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.skip()).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current: u32,
    pub total: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    /// `returned` is the number of items on this page, `total_items` the
    /// number of items across all pages.
    pub fn new(request: &PageRequest, returned: usize, total_items: u64) -> Self {
        let limit = u64::from(request.limit);
        let total_pages = total_items.div_ceil(limit);

        Self {
            current: request.page,
            total: u32::try_from(total_pages).unwrap_or(u32::MAX),
            has_next: request.skip() + (returned as u64) < total_items,
            has_prev: request.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_are_missing() {
        let req = PageRequest::from_query(None, None, PUBLIC_PAGE_LIMIT).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 50 });
        assert_eq!(req.skip(), 0);

        let admin = PageRequest::from_query(Some(3), None, ADMIN_PAGE_LIMIT).unwrap();
        assert_eq!(admin.skip(), 40);
        assert_eq!(admin.sql_offset(), 40);
        assert_eq!(admin.sql_limit(), 20);
    }

    #[test]
    fn rejects_zero_page_and_zero_limit() {
        assert!(matches!(PageRequest::from_query(Some(0), None, 20), Err(AppError::InvalidQuery(_))));
        assert!(matches!(PageRequest::from_query(None, Some(0), 20), Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn oversized_limit_is_capped() {
        let req = PageRequest::from_query(Some(2), Some(200), PUBLIC_PAGE_LIMIT).unwrap();
        assert_eq!(req, PageRequest { page: 2, limit: MAX_PAGE_LIMIT });
        assert_eq!(req.skip(), 100);

        let exact = PageRequest::from_query(None, Some(MAX_PAGE_LIMIT), ADMIN_PAGE_LIMIT).unwrap();
        assert_eq!(exact.limit, MAX_PAGE_LIMIT);
    }

    #[test]
    fn page_info_matches_counts() {
        let req = PageRequest { page: 1, limit: 20 };
        assert_eq!(
            PageInfo::new(&req, 20, 45),
            PageInfo { current: 1, total: 3, has_next: true, has_prev: false }
        );

        let last = PageRequest { page: 3, limit: 20 };
        assert_eq!(
            PageInfo::new(&last, 5, 45),
            PageInfo { current: 3, total: 3, has_next: false, has_prev: true }
        );
    }

    #[test]
    fn empty_result_has_no_pages() {
        let req = PageRequest { page: 1, limit: 50 };
        assert_eq!(
            PageInfo::new(&req, 0, 0),
            PageInfo { current: 1, total: 0, has_next: false, has_prev: false }
        );
    }

    #[test]
    fn page_past_the_end_is_empty_with_prev() {
        let info = PageInfo::new(&PageRequest { page: 4, limit: 5 }, 0, 10);
        assert_eq!(info, PageInfo { current: 4, total: 2, has_next: false, has_prev: true });
    }
}
