use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Items per page (max 100)
    pub limit: Option<u64>,
}

/// `LIMIT`/`OFFSET` window for a list query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Page numbers start at 1; the limit is clamped to `1..=MAX_LIMIT`.
    /// A page so far out that its offset overflows is a bad request.
    pub fn from_query(page: Option<u64>, limit: Option<u64>) -> Result<Self, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let page = page.unwrap_or(1).max(1);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| ApiError::BadRequest(format!("page {page} is out of range")))?;

        Ok(Page {
            page,
            limit,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{ResponseError, http::StatusCode};

    #[test]
    fn defaults_to_first_page_of_ten() {
        assert_eq!(
            Page::from_query(None, None).unwrap(),
            Page {
                page: 1,
                limit: 10,
                offset: 0
            }
        );
    }

    #[test]
    fn limit_and_page_are_clamped() {
        let p = Page::from_query(Some(0), Some(1_000)).unwrap();
        assert_eq!((p.page, p.limit, p.offset), (1, MAX_LIMIT, 0));

        let p = Page::from_query(Some(3), Some(0)).unwrap();
        assert_eq!((p.page, p.limit, p.offset), (3, 1, 2));
    }

    #[test]
    fn huge_page_is_a_bad_request_not_a_panic() {
        let err = Page::from_query(Some(u64::MAX), Some(100)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn largest_page_that_fits_is_accepted() {
        let page = u64::MAX / 100 + 1;
        let p = Page::from_query(Some(page), Some(100)).unwrap();
        assert_eq!(p.offset, (page - 1) * 100);
    }
}
