//! Endpoint selection for paged product listings and the cache keys callers
//! use to coalesce identical requests.
//!
//! The remote service filters on one dimension at a time, so a non-empty
//! search term always wins over a category filter.

use std::fmt;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use shopdash_core::page_window;

/// Category value that means "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Parameters for one page of the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Zero-based page index.
    pub page: u32,
    pub search: Option<String>,
    /// Category slug; `None`, empty, or [`ALL_CATEGORIES`] disables the filter.
    pub category: Option<String>,
}

impl ProductQuery {
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    fn category_slug(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
    }

    /// Stable cache key for this query.
    #[must_use]
    pub fn query_key(&self) -> QueryKey {
        QueryKey::ProductsPage {
            page: self.page,
            search: self.search_term().unwrap_or_default().to_string(),
            category: self.category_slug().unwrap_or(ALL_CATEGORIES).to_string(),
        }
    }
}

/// The endpoint and query parameters chosen for a [`ProductQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    /// Path segments below the base URL, unencoded.
    pub segments: Vec<String>,
    pub params: Vec<(&'static str, String)>,
}

/// Chooses search, category, or unfiltered listing for `query`.
///
/// All three apply `limit = 10` and `skip = page * 10`. When a search term is
/// present the category is ignored.
#[must_use]
pub fn select_listing(query: &ProductQuery) -> ListingRequest {
    let (limit, skip) = page_window(query.page);
    let window = [("limit", limit.to_string()), ("skip", skip.to_string())];

    if let Some(term) = query.search_term() {
        let mut params = vec![("q", term.to_string())];
        params.extend(window);
        return ListingRequest {
            segments: vec!["products".to_string(), "search".to_string()],
            params,
        };
    }

    if let Some(slug) = query.category_slug() {
        return ListingRequest {
            segments: vec![
                "products".to_string(),
                "category".to_string(),
                slug.to_string(),
            ],
            params: window.to_vec(),
        };
    }

    ListingRequest {
        segments: vec!["products".to_string()],
        params: window.to_vec(),
    }
}

/// Identifies a read operation and its parameters for caller-side caching.
///
/// Two calls with equal keys are interchangeable; the adapter itself never
/// deduplicates. The string form percent-encodes user input, so distinct
/// keys never render to the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AllProducts,
    ProductsPage {
        page: u32,
        search: String,
        category: String,
    },
    Categories,
    Orders,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::AllProducts => write!(f, "products/all"),
            QueryKey::ProductsPage {
                page,
                search,
                category,
            } => write!(
                f,
                "products/page?page={page}&search={}&category={}",
                utf8_percent_encode(search, NON_ALPHANUMERIC),
                utf8_percent_encode(category, NON_ALPHANUMERIC),
            ),
            QueryKey::Categories => write!(f, "categories"),
            QueryKey::Orders => write!(f, "orders"),
        }
    }
}
