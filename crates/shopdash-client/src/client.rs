//! HTTP adapter for the `DummyJSON` product service.
//!
//! Every operation is a single stateless round trip: build the URL, send,
//! reject non-2xx statuses, decode JSON, then run the body through the
//! matching schema in [`shopdash_core::schema`]. Nothing is retried here;
//! [`ApiError::is_retriable`] tells the caller whether a retry makes sense.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::{json, Value};
use shopdash_core::schema::{
    parse_carts_page, parse_categories, parse_created_id, parse_product, parse_products_page,
};
use shopdash_core::{
    AddProductData, AppConfig, CartsPage, Category, DeletedProduct, Dimensions, Product,
    ProductsPage, Review, ValidationError,
};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::listing::{select_listing, ProductQuery, QueryKey};

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// Thumbnail assigned to products created through [`DummyJsonClient::add_product`];
/// the service does not return one.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://i.dummyjson.com/v1/images/preview/infant-1.jpg";

/// Client for the `DummyJSON` REST API.
///
/// Holds no per-call state, so a single instance can serve concurrent calls.
/// Use [`DummyJsonClient::new`] for production or
/// [`DummyJsonClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct DummyJsonClient {
    client: Client,
    base_url: Url,
}

impl DummyJsonClient {
    /// Creates a client pointed at the public `DummyJSON` service.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ApiError::InvalidBaseUrl`] if `base_url` cannot serve as a base.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Self::with_http_client(client, base_url)
    }

    /// Wraps an existing `reqwest::Client`, leaving timeouts, proxies, and
    /// connection pooling to whoever built it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` does not parse or
    /// cannot carry path segments.
    pub fn with_http_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason,
        };

        // Normalise to exactly one trailing slash so path segments append
        // below any prefix in the base URL instead of replacing its last part.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_string()));
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// # Errors
    ///
    /// See [`DummyJsonClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::with_base_url(
            config.request_timeout_secs,
            &config.user_agent,
            &config.api_base_url,
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Cache key for [`DummyJsonClient::fetch_all_products`].
    #[must_use]
    pub fn all_products_key() -> QueryKey {
        QueryKey::AllProducts
    }

    /// Cache key for [`DummyJsonClient::fetch_products`] with `query`.
    #[must_use]
    pub fn products_key(query: &ProductQuery) -> QueryKey {
        query.query_key()
    }

    /// Cache key for [`DummyJsonClient::fetch_categories`].
    #[must_use]
    pub fn categories_key() -> QueryKey {
        QueryKey::Categories
    }

    /// Cache key for [`DummyJsonClient::fetch_orders`].
    #[must_use]
    pub fn orders_key() -> QueryKey {
        QueryKey::Orders
    }

    /// Fetches the whole catalog in one response (`limit=0`).
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Status`] if the request fails.
    /// - [`ApiError::Validation`] if any product violates the schema.
    /// - [`ApiError::Cancelled`] if `cancel` fires first.
    pub async fn fetch_all_products(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ProductsPage, ApiError> {
        let url = self.endpoint(&["products"], &[("limit", "0".to_string())]);
        let body = self.get_json(url, cancel).await?;
        validated(
            &Self::all_products_key().to_string(),
            parse_products_page(&body),
        )
    }

    /// Fetches one page of products, choosing the endpoint with
    /// [`select_listing`]. The returned `total` counts the filtered set.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Status`] if the request fails.
    /// - [`ApiError::Validation`] if any product violates the schema.
    /// - [`ApiError::Cancelled`] if `cancel` fires first.
    pub async fn fetch_products(
        &self,
        query: &ProductQuery,
        cancel: &CancellationToken,
    ) -> Result<ProductsPage, ApiError> {
        let listing = select_listing(query);
        let segments: Vec<&str> = listing.segments.iter().map(String::as_str).collect();
        let url = self.endpoint(&segments, &listing.params);
        let body = self.get_json(url, cancel).await?;
        validated(
            &Self::products_key(query).to_string(),
            parse_products_page(&body),
        )
    }

    /// Creates a product and returns it as a complete [`Product`].
    ///
    /// The service only acknowledges the new `id`, so the remaining fields are
    /// filled with fixed defaults (zero rating and discount, no images or
    /// reviews, zero dimensions, [`PLACEHOLDER_THUMBNAIL`]) and the merged
    /// record is validated against the product schema before it is returned.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Status`] if the request fails.
    /// - [`ApiError::Validation`] if the acknowledgement has no usable `id` or
    ///   the merged product violates the schema.
    /// - [`ApiError::Cancelled`] if `cancel` fires first.
    pub async fn add_product(
        &self,
        data: &AddProductData,
        cancel: &CancellationToken,
    ) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", "add"], &[]);
        let body = self.send_json(Method::POST, url, data, cancel).await?;
        let id = validated("created product id", parse_created_id(&body))?;

        tracing::debug!(id, title = %data.title, "product created; synthesizing full record");
        validated(
            &format!("created product {id}"),
            parse_product(&created_product(data, id)),
        )
    }

    /// Sends every mutable field of `product` to the update endpoint. The id
    /// travels in the path only.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Status`] if the request fails.
    /// - [`ApiError::Validation`] if the echoed product violates the schema.
    /// - [`ApiError::Cancelled`] if `cancel` fires first.
    pub async fn update_product(
        &self,
        product: &Product,
        cancel: &CancellationToken,
    ) -> Result<Product, ApiError> {
        let id = product.id.to_string();
        let url = self.endpoint(&["products", id.as_str()], &[]);
        let body = self
            .send_json(Method::PUT, url, &ProductBody::from(product), cancel)
            .await?;
        validated(&format!("updated product {id}"), parse_product(&body))
    }

    /// Deletes a product. Any 2xx response counts as success; the body is
    /// not inspected.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Status`] if the request fails.
    /// - [`ApiError::Cancelled`] if `cancel` fires first.
    pub async fn delete_product(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<DeletedProduct, ApiError> {
        let id_segment = id.to_string();
        let url = self.endpoint(&["products", id_segment.as_str()], &[]);
        tracing::debug!(%url, "DELETE");
        let request = self.client.request(Method::DELETE, url.clone());
        cancellable(cancel, async {
            let response = request.send().await.inspect_err(|e| {
                tracing::warn!(%url, error = %e, "request failed");
            })?;
            check_status(&response, &url)?;
            Ok(())
        })
        .await?;
        tracing::debug!(id, "product deleted");
        Ok(DeletedProduct { id })
    }

    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Status`] if the request fails.
    /// - [`ApiError::Validation`] if any category violates the schema.
    /// - [`ApiError::Cancelled`] if `cancel` fires first.
    pub async fn fetch_categories(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint(&["products", "categories"], &[]);
        let body = self.get_json(url, cancel).await?;
        validated(&Self::categories_key().to_string(), parse_categories(&body))
    }

    /// Fetches carts, which the dashboard presents as orders.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] / [`ApiError::Status`] if the request fails.
    /// - [`ApiError::Validation`] if any cart violates the schema.
    /// - [`ApiError::Cancelled`] if `cancel` fires first.
    pub async fn fetch_orders(&self, cancel: &CancellationToken) -> Result<CartsPage, ApiError> {
        let url = self.endpoint(&["carts"], &[]);
        let body = self.get_json(url, cancel).await?;
        validated(&Self::orders_key().to_string(), parse_carts_page(&body))
    }

    /// Builds the full request URL. Segments are percent-encoded, so a
    /// category slug can never escape its path position.
    fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    async fn get_json(&self, url: Url, cancel: &CancellationToken) -> Result<Value, ApiError> {
        tracing::debug!(%url, "GET");
        let request = self.client.get(url.clone());
        cancellable(cancel, read_json(request, url)).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<Value, ApiError> {
        tracing::debug!(%method, %url, "sending JSON body");
        let request = self.client.request(method, url.clone()).json(body);
        cancellable(cancel, read_json(request, url)).await
    }
}

/// Outgoing body for an update: every product field except `id`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody<'a> {
    title: &'a str,
    description: &'a str,
    price: f64,
    discount_percentage: f64,
    rating: f64,
    stock: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<&'a str>,
    category: &'a str,
    thumbnail: &'a str,
    images: &'a [String],
    reviews: &'a [Review],
    dimensions: Dimensions,
}

impl<'a> From<&'a Product> for ProductBody<'a> {
    fn from(p: &'a Product) -> Self {
        Self {
            title: &p.title,
            description: &p.description,
            price: p.price,
            discount_percentage: p.discount_percentage,
            rating: p.rating,
            stock: p.stock,
            brand: p.brand.as_deref(),
            category: &p.category,
            thumbnail: &p.thumbnail,
            images: &p.images,
            reviews: &p.reviews,
            dimensions: p.dimensions,
        }
    }
}

/// Merges the submitted fields with the defaults the service does not supply.
fn created_product(data: &AddProductData, id: u64) -> Value {
    let mut product = json!({
        "id": id,
        "title": data.title,
        "description": data.description,
        "price": data.price,
        "discountPercentage": 0.0,
        "rating": 0.0,
        "stock": data.stock,
        "category": data.category,
        "thumbnail": PLACEHOLDER_THUMBNAIL,
        "images": [],
        "reviews": [],
        "dimensions": { "width": 0.0, "height": 0.0, "depth": 0.0 },
    });
    if let Some(brand) = &data.brand {
        product["brand"] = Value::String(brand.clone());
    }
    product
}

/// Races `operation` against the caller's token. Once the token fires the
/// in-flight request is dropped and [`ApiError::Cancelled`] is returned.
async fn cancellable<T, Fut>(cancel: &CancellationToken, operation: Fut) -> Result<T, ApiError>
where
    Fut: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!("request cancelled by caller");
            Err(ApiError::Cancelled)
        }
        result = operation => result,
    }
}

async fn read_json(request: reqwest::RequestBuilder, url: Url) -> Result<Value, ApiError> {
    let response = request.send().await.inspect_err(|e| {
        tracing::warn!(%url, error = %e, "request failed");
    })?;
    check_status(&response, &url)?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::warn!(%url, error = %e, "response body is not JSON");
        ApiError::Validation {
            context: url.to_string(),
            source: ValidationError::malformed_json(&e),
        }
    })
}

fn check_status(response: &reqwest::Response, url: &Url) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    tracing::warn!(%url, status = status.as_u16(), "unexpected HTTP status");
    Err(ApiError::Status {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

fn validated<T>(context: &str, parsed: Result<T, ValidationError>) -> Result<T, ApiError> {
    parsed.map_err(|source| {
        tracing::warn!(
            context,
            violations = source.violations.len(),
            error = %source,
            "response failed schema validation"
        );
        ApiError::Validation {
            context: context.to_owned(),
            source,
        }
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
