//! Fixed-size page arithmetic and local page maintenance after mutations.
//!
//! The `ProductsPage` helpers are for callers that hold a cached listing page
//! and want it to reflect a create, update, or delete without refetching. The
//! adapter returns the values they take (`Product`, `DeletedProduct`) but
//! never calls them itself.

use crate::schema::{DeletedProduct, Product, ProductsPage};

/// Number of products per listing page.
pub const PAGE_SIZE: u32 = 10;

/// Returns `(limit, skip)` for zero-based `page`.
#[must_use]
pub fn page_window(page: u32) -> (u32, u64) {
    (PAGE_SIZE, u64::from(page) * u64::from(PAGE_SIZE))
}

/// Navigation state for a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Zero-based page index.
    pub page: u32,
    /// Always at least 1, even for an empty result set.
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    /// `total` is the filtered total reported alongside the page.
    #[must_use]
    pub fn new(page: u32, total: u64) -> Self {
        let size = u64::from(PAGE_SIZE);
        Self {
            page,
            total_pages: total.div_ceil(size).max(1),
            has_previous: page > 0,
            has_next: (u64::from(page) + 1) * size < total,
        }
    }
}

/// Caller-side cache maintenance. Each method applies one adapter mutation
/// result to a page the caller already holds.
impl ProductsPage {
    /// Puts a freshly created product at the head of the page, keeping the
    /// page at most [`PAGE_SIZE`] long.
    pub fn insert_created(&mut self, product: Product) {
        self.products.insert(0, product);
        self.products.truncate(PAGE_SIZE as usize);
    }

    /// Swaps in `product` for the entry with the same id. Returns `false`
    /// when the page does not hold that id.
    pub fn replace_updated(&mut self, product: Product) -> bool {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product;
                true
            }
            None => false,
        }
    }

    /// Drops the deleted product from the page. Returns `false` when the
    /// page does not hold that id.
    pub fn remove_deleted(&mut self, deleted: DeletedProduct) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != deleted.id);
        self.products.len() != before
    }
}
