use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use utoipa::IntoParams;

/// Response header carrying the unpaginated record count.
pub const TOTAL_RECORDS_HEADER: HeaderName = HeaderName::from_static("totalamountofrecords");

const DEFAULT_RECORDS_PER_PAGE: u64 = 10;

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// One-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 10, capped by configuration)
    pub records_per_page: Option<u64>,
}

/// A page request after defaults and the size cap are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Zero-based, as `Paginator::fetch_page` expects
    pub page_index: u64,
    pub records_per_page: u64,
}

impl PaginationQuery {
    pub fn new(page: Option<u64>, records_per_page: Option<u64>) -> Self {
        Self {
            page,
            records_per_page,
        }
    }

    pub fn window(&self, max_records_per_page: u64) -> PageWindow {
        let records_per_page = self
            .records_per_page
            .unwrap_or(DEFAULT_RECORDS_PER_PAGE)
            .clamp(1, max_records_per_page.max(1));
        let page = self.page.unwrap_or(1).max(1);

        PageWindow {
            page_index: page - 1,
            records_per_page,
        }
    }
}

pub fn total_records_header(total: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_RECORDS_HEADER, HeaderValue::from(total));
    headers
}
