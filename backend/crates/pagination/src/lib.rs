//! Page/limit pagination primitives shared by list endpoints.
//!
//! List endpoints accept a 1-based `page` and a `perPage` size, and return a
//! [`PageEnvelope`] carrying the items for that page together with the total
//! number of matching records and the derived page count. Nothing is
//! clamped silently; out-of-range values are rejected.

use serde::{Deserialize, Serialize};

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Failures raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// `page` was zero; pages are 1-based.
    #[error("page must be at least 1")]
    ZeroPage,
    /// `perPage` was zero.
    #[error("perPage must be at least 1")]
    ZeroPerPage,
    /// `perPage` exceeded [`MAX_PER_PAGE`].
    #[error("perPage must not exceed {MAX_PER_PAGE}")]
    OversizedPage,
}

/// Validated pagination window for a list query.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 12).expect("valid window");
/// assert_eq!(request.offset(), 12);
/// assert_eq!(request.limit(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a validated request from a 1-based page and a page size.
    pub const fn new(page: u32, per_page: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PageRequestError::ZeroPerPage);
        }
        if per_page > MAX_PER_PAGE {
            return Err(PageRequestError::OversizedPage);
        }
        Ok(Self { page, per_page })
    }

    /// Build a request from optional query parameters, falling back to
    /// page 1 and the provided default size when absent.
    pub const fn from_query(
        page: Option<u32>,
        per_page: Option<u32>,
        default_per_page: u32,
    ) -> Result<Self, PageRequestError> {
        let page = match page {
            Some(value) => value,
            None => 1,
        };
        let per_page = match per_page {
            Some(value) => value,
            None => default_per_page,
        };
        Self::new(page, per_page)
    }

    /// The 1-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Offset of the first item on this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * (self.per_page as u64)
    }

    /// Maximum number of items this page may carry.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

/// One page of results plus the bookkeeping clients need for paging UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Items on the requested page, in query order.
    pub items: Vec<T>,
    /// The 1-based page these items belong to.
    pub page: u32,
    /// Total number of pages for the query.
    pub pages: u64,
    /// Total number of records matching the query.
    pub total: u64,
}

impl<T> PageEnvelope<T> {
    /// Assemble an envelope from a page of items and the total match count.
    ///
    /// The page count is derived by ceiling division; an empty result set
    /// reports zero pages.
    #[must_use]
    pub fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            pages: total.div_ceil(u64::from(request.per_page())),
            total,
        }
    }

    /// Map the item type while preserving the paging bookkeeping.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageEnvelope<U> {
        PageEnvelope {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            pages: self.pages,
            total: self.total,
        }
    }
}
