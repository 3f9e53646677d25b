//! Command handlers. Each one issues a single adapter call, prints the result
//! as JSON on stdout, and maps typed failures to a readable error.

use std::path::Path;

use anyhow::Context;
use serde_json::json;
use shopdash_client::{ApiError, CancellationToken, DummyJsonClient, ProductQuery};
use shopdash_core::schema::{parse_add_product, parse_product};
use shopdash_core::{AnalyticsSummary, DashboardSummary, OrderRow, PageInfo, StockStatus};

/// Raw create-form input, validated with the add-product schema before any
/// request is sent.
#[derive(Debug, Clone)]
pub(crate) struct ProductForm {
    pub title: String,
    pub brand: Option<String>,
    pub price: f64,
    pub stock: u64,
    pub category: String,
    pub description: String,
}

impl ProductForm {
    pub(crate) fn to_value(&self) -> serde_json::Value {
        let mut value = json!({
            "title": self.title,
            "price": self.price,
            "stock": self.stock,
            "category": self.category,
            "description": self.description,
        });
        if let Some(brand) = self.brand.as_deref().filter(|b| !b.is_empty()) {
            value["brand"] = json!(brand);
        }
        value
    }
}

pub(crate) async fn list_products(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
    page: u32,
    search: Option<String>,
    category: Option<String>,
) -> anyhow::Result<()> {
    let query = ProductQuery {
        page,
        search,
        category,
    };
    let key = query.query_key();
    let listing = client
        .fetch_products(&query, cancel)
        .await
        .map_err(|e| describe_failure(e, "list products"))?;

    let info = PageInfo::new(page, listing.total);
    let rows: Vec<_> = listing
        .products
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "title": p.title,
                "category": p.category,
                "price": p.price,
                "stock": p.stock,
                "status": StockStatus::for_stock(p.stock).to_string(),
            })
        })
        .collect();

    print_json(&json!({
        "query": key.to_string(),
        "page": info.page + 1,
        "total_pages": info.total_pages,
        "has_previous": info.has_previous,
        "has_next": info.has_next,
        "total": listing.total,
        "products": rows,
    }))
}

pub(crate) async fn all_products(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let listing = client
        .fetch_all_products(cancel)
        .await
        .map_err(|e| describe_failure(e, "fetch all products"))?;
    print_json(&listing)
}

pub(crate) async fn create_product(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
    form: ProductForm,
) -> anyhow::Result<()> {
    let data = parse_add_product(&form.to_value())
        .map_err(|e| anyhow::anyhow!("product form is invalid: {e}"))?;
    let product = client
        .add_product(&data, cancel)
        .await
        .map_err(|e| describe_failure(e, "add product"))?;
    tracing::info!(id = product.id, title = %product.title, "product added");
    print_json(&product)
}

pub(crate) async fn update_product(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
    file: &Path,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let product =
        parse_product(&value).map_err(|e| anyhow::anyhow!("product record is invalid: {e}"))?;

    let updated = client
        .update_product(&product, cancel)
        .await
        .map_err(|e| describe_failure(e, "update product"))?;
    tracing::info!(id = updated.id, title = %updated.title, "product updated");
    print_json(&updated)
}

pub(crate) async fn delete_product(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
    id: u64,
) -> anyhow::Result<()> {
    let deleted = client
        .delete_product(id, cancel)
        .await
        .map_err(|e| describe_failure(e, "delete product"))?;
    tracing::info!(id = deleted.id, "product deleted");
    print_json(&deleted)
}

pub(crate) async fn categories(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let categories = client
        .fetch_categories(cancel)
        .await
        .map_err(|e| describe_failure(e, "list categories"))?;
    print_json(&categories)
}

pub(crate) async fn orders(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let carts = client
        .fetch_orders(cancel)
        .await
        .map_err(|e| describe_failure(e, "list orders"))?;
    let rows: Vec<OrderRow> = carts.carts.iter().map(OrderRow::from_cart).collect();
    print_json(&rows)
}

pub(crate) async fn dashboard(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let listing = client
        .fetch_all_products(cancel)
        .await
        .map_err(|e| describe_failure(e, "load dashboard"))?;
    print_json(&DashboardSummary::from_page(&listing))
}

pub(crate) async fn analytics(
    client: &DummyJsonClient,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let listing = client
        .fetch_all_products(cancel)
        .await
        .map_err(|e| describe_failure(e, "load analytics"))?;
    print_json(&AnalyticsSummary::from_products(&listing.products))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Wraps an adapter failure with the action that failed and a retry hint.
pub(crate) fn describe_failure(err: ApiError, action: &str) -> anyhow::Error {
    let hint = if err.is_retriable() {
        " (transient; retrying may help)"
    } else {
        ""
    };
    let message = format!("failed to {action}{hint}");
    anyhow::Error::new(err).context(message)
}
