//! Pagination handling for list endpoints.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// Pagination links parsed from the `Link` header.
#[derive(Debug, Clone, Default)]
pub struct PaginationLinks {
    /// URL for the next page.
    pub next: Option<String>,
    /// URL for the previous page.
    pub prev: Option<String>,
    /// URL for the first page.
    pub first: Option<String>,
    /// URL for the last page.
    pub last: Option<String>,
}

impl PaginationLinks {
    /// Parses pagination links from a `Link` header value (RFC 8288).
    pub fn from_header(header_value: &str) -> Self {
        let mut links = Self::default();

        for part in header_value.split(',') {
            let mut url = None;
            let mut rel = None;

            for segment in part.split(';') {
                let segment = segment.trim();
                if segment.starts_with('<') && segment.ends_with('>') {
                    url = Some(segment[1..segment.len() - 1].to_string());
                } else if let Some(value) = segment.strip_prefix("rel=") {
                    rel = Some(value.trim_matches('"').to_string());
                }
            }

            if let (Some(url), Some(rel)) = (url, rel) {
                match rel.as_str() {
                    "next" => links.next = Some(url),
                    "prev" => links.prev = Some(url),
                    "first" => links.first = Some(url),
                    "last" => links.last = Some(url),
                    _ => {}
                }
            }
        }

        links
    }

    /// Parses pagination links from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default()
    }

    /// Returns true if the header advertised a next page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns true if the header advertised a previous page.
    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }

    /// Gets the total page count from the `last` link's page parameter.
    pub fn total_pages(&self) -> Option<u32> {
        self.last.as_ref().and_then(|url| {
            url::Url::parse(url).ok().and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "page")
                    .and_then(|(_, v)| v.parse().ok())
            })
        })
    }
}

/// A single page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Pagination links from the response.
    pub links: PaginationLinks,
    /// Requested page number (1-indexed).
    pub page: u32,
    /// Requested items per page.
    pub per_page: u32,
    /// Total count, when the endpoint supplies one (search, run envelopes).
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Creates a new page.
    pub fn new(items: Vec<T>, links: PaginationLinks, page: u32, per_page: u32) -> Self {
        Self {
            items,
            links,
            page,
            per_page,
            total_count: None,
        }
    }

    /// Sets the total count.
    pub fn with_total_count(mut self, count: u64) -> Self {
        self.total_count = Some(count);
        self
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.links.has_next()
    }

    /// Returns true if there is a previous page.
    ///
    /// Derived from the requested page number rather than the header's
    /// `prev` relation, which the upstream omits inconsistently near page 1.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Pagination parameters for list requests.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationParams {
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page (max 100).
    pub per_page: u32,
}

impl PaginationParams {
    /// Creates pagination parameters, clamping per_page to the API maximum.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.min(100),
        }
    }

    /// Converts to query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ]
    }
}

/// Search endpoint envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults<T> {
    /// Total match count across all pages.
    pub total_count: u64,
    /// Whether the search timed out and returned partial results.
    #[serde(default)]
    pub incomplete_results: bool,
    /// Matched items.
    pub items: Vec<T>,
}
