//! Aggregations the dashboard and analytics views compute over validated
//! product and cart data.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::schema::{Cart, Product, ProductsPage};

/// Categories shown individually in the distribution before the rest are
/// folded into [`OTHER_BUCKET`].
pub const MAX_CATEGORY_SLICES: usize = 6;
pub const OTHER_BUCKET: &str = "Other";
pub const TOP_BRANDS: usize = 10;
/// Stock below this (and above zero) counts as low.
pub const LOW_STOCK_THRESHOLD: u64 = 10;

/// A labelled value for a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    #[must_use]
    pub fn for_stock(stock: u64) -> Self {
        match stock {
            0 => StockStatus::OutOfStock,
            s if s < LOW_STOCK_THRESHOLD => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::OutOfStock => write!(f, "Out of Stock"),
            StockStatus::LowStock => write!(f, "Low Stock"),
            StockStatus::InStock => write!(f, "In Stock"),
        }
    }
}

/// Headline numbers for the dashboard landing view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The listing's reported total, not the number of products returned.
    pub total_products: u64,
    /// Sum of `price * stock` over all products.
    pub total_stock_value: f64,
    pub out_of_stock_count: usize,
    pub category_count: usize,
    /// Units in stock per category, highest first.
    pub stock_by_category: Vec<NamedValue>,
}

impl DashboardSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_page(page: &ProductsPage) -> Self {
        let products = &page.products;

        let total_stock_value = products.iter().map(stock_value).sum();
        let out_of_stock_count = products.iter().filter(|p| p.stock == 0).count();
        let category_count = products
            .iter()
            .map(|p| p.category.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let mut stock: BTreeMap<&str, u64> = BTreeMap::new();
        for p in products {
            *stock.entry(p.category.as_str()).or_default() += p.stock;
        }
        let stock_by_category =
            ranked(stock.into_iter().map(|(name, units)| (name, units as f64)));

        Self {
            total_products: page.total,
            total_stock_value,
            out_of_stock_count,
            category_count,
            stock_by_category,
        }
    }
}

/// Chart series for the analytics view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    /// Product count per category, highest first, with the long tail folded
    /// into a single `"Other"` entry.
    pub category_distribution: Vec<NamedValue>,
    /// Inventory value (`price * stock`) per brand, highest first.
    pub top_brands: Vec<NamedValue>,
}

impl AnalyticsSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_products(products: &[Product]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for p in products {
            *counts.entry(p.category.as_str()).or_default() += 1;
        }
        let mut category_distribution =
            ranked(counts.into_iter().map(|(name, n)| (name, n as f64)));

        if category_distribution.len() > MAX_CATEGORY_SLICES {
            let tail = category_distribution.split_off(MAX_CATEGORY_SLICES - 1);
            category_distribution.push(NamedValue {
                name: OTHER_BUCKET.to_string(),
                value: tail.iter().map(|c| c.value).sum(),
            });
        }

        let mut brand_value: BTreeMap<&str, f64> = BTreeMap::new();
        for p in products {
            if let Some(brand) = p.brand.as_deref().filter(|b| !b.is_empty()) {
                *brand_value.entry(brand).or_default() += stock_value(p);
            }
        }
        let mut top_brands = ranked(brand_value.into_iter());
        top_brands.truncate(TOP_BRANDS);

        Self {
            category_distribution,
            top_brands,
        }
    }
}

/// One row of the orders table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub order_id: u64,
    pub customer_id: u64,
    pub product_count: usize,
    pub total_amount: f64,
}

impl OrderRow {
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            order_id: cart.id,
            customer_id: cart.user_id,
            product_count: cart.products.len(),
            total_amount: cart.total,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn stock_value(p: &Product) -> f64 {
    p.price * p.stock as f64
}

/// Sorts by value descending; ties keep name order so output is stable.
fn ranked<'a>(entries: impl Iterator<Item = (&'a str, f64)>) -> Vec<NamedValue> {
    let mut out: Vec<NamedValue> = entries
        .map(|(name, value)| NamedValue {
            name: name.to_string(),
            value,
        })
        .collect();
    out.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    out
}
