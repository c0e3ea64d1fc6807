//! Offset pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] is validated once at the edge (page and limit are
//! one-based, positive, and bounded) and then handed to repositories, which
//! translate it into an offset and limit. Results travel back wrapped in a
//! [`Page`] envelope whose JSON shape is
//! `{ "items": [...], "page": 1, "limit": 10, "total": 42, "pages": 5 }`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page used when the caller does not supply one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while validating page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Page numbers are one-based.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The requested page size exceeds [`MAX_LIMIT`].
    #[error("limit must not exceed {max}")]
    LimitTooLarge {
        /// Maximum accepted page size.
        max: u32,
    },
}

/// Validated one-based page request.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(Some(3), Some(50)).expect("valid page");
/// assert_eq!(request.offset(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate optional page parameters, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` or `limit` is zero, or when
    /// `limit` exceeds [`MAX_LIMIT`].
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// The first page with the given limit, clamped into the valid range.
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// The page that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A single page of results plus the totals needed to render pagers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in repository order.
    pub items: Vec<T>,
    /// One-based page number that was requested.
    pub page: u32,
    /// Page size that was requested.
    pub limit: u32,
    /// Number of matching items across all pages.
    pub total: u64,
    /// Number of pages, `ceil(total / limit)`.
    pub pages: u64,
}

impl<T> Page<T> {
    /// Wrap a slice of results for the given request and total count.
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let request = PageRequest::new(Some(3), Some(50)).expect("valid page");
    /// let page = Page::new(vec![0_u8; 25], request, 125);
    /// assert_eq!(page.pages, 3);
    /// ```
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
            total,
            pages: total.div_ceil(u64::from(request.limit())),
        }
    }

    /// Whether a later page may hold more items.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.page) < self.pages
    }

    /// Convert every item while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page validation and envelope arithmetic.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_parameters_are_missing() {
        let request = PageRequest::new(None, None).expect("defaults are valid");
        assert_eq!(request.page(), DEFAULT_PAGE);
        assert_eq!(request.limit(), DEFAULT_LIMIT);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), None, PageRequestError::ZeroPage)]
    #[case(None, Some(0), PageRequestError::ZeroLimit)]
    #[case(None, Some(MAX_LIMIT + 1), PageRequestError::LimitTooLarge { max: MAX_LIMIT })]
    fn invalid_parameters_are_rejected(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: PageRequestError,
    ) {
        let err = PageRequest::new(page, limit).expect_err("invalid parameters");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(125, 50, 3)]
    #[case(100, 50, 2)]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    fn pages_round_up(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        let request = PageRequest::new(Some(1), Some(limit)).expect("valid request");
        let page: Page<u8> = Page::new(Vec::new(), request, total);
        assert_eq!(page.pages, expected);
    }

    #[rstest]
    fn third_page_of_fifty_skips_one_hundred() {
        let request = PageRequest::new(Some(3), Some(50)).expect("valid request");
        assert_eq!(request.offset(), 100);
        let page = Page::new(vec![1_u8; 25], request, 125);
        assert!(!page.has_more());
    }

    #[rstest]
    fn first_clamps_out_of_range_limits() {
        assert_eq!(PageRequest::first(0).limit(), 1);
        assert_eq!(PageRequest::first(500).limit(), MAX_LIMIT);
        assert_eq!(PageRequest::first(20).next().page(), 2);
    }

    #[rstest]
    fn page_serialises_with_camel_case_envelope() {
        let request = PageRequest::new(Some(2), Some(2)).expect("valid request");
        let page = Page::new(vec!["a", "b"], request, 5).map(str::to_uppercase);
        let json = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            json,
            serde_json::json!({
                "items": ["A", "B"],
                "page": 2,
                "limit": 2,
                "total": 5,
                "pages": 3
            })
        );
    }
}
