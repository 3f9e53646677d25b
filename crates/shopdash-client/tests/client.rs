//! Integration tests for `DummyJsonClient` using wiremock HTTP mocks.
//!
//! Each test stands up a local server, so no real network traffic is made.
//! Coverage: every operation's happy path, the search/category/unfiltered
//! selection as seen on the wire, transport versus validation failures, and
//! cancellation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopdash_client::{
    ApiError, CancellationToken, DummyJsonClient, FailureKind, ProductQuery,
    PLACEHOLDER_THUMBNAIL,
};
use shopdash_core::schema::parse_product;
use shopdash_core::AddProductData;

fn test_client(base_url: &str) -> DummyJsonClient {
    DummyJsonClient::with_base_url(5, "shopdash-test/0.1", base_url)
        .expect("client construction should not fail")
}

fn product_json(id: u64) -> Value {
    json!({
        "id": id,
        "title": "Essence Mascara Lash Princess",
        "description": "A popular mascara known for its volumizing effects.",
        "price": 9.99,
        "discountPercentage": 7.17,
        "rating": 4.94,
        "stock": 5,
        "brand": "Essence",
        "category": "beauty",
        "thumbnail": "https://cdn.dummyjson.com/products/images/beauty/thumbnail.png",
        "images": ["https://cdn.dummyjson.com/products/images/beauty/1.png"],
        "reviews": [{
            "rating": 2,
            "comment": "Very unhappy with my purchase!",
            "date": "2024-05-23T08:56:21.618Z",
            "reviewerName": "John Doe",
            "reviewerEmail": "john.doe@x.dummyjson.com"
        }],
        "dimensions": { "width": 23.17, "height": 14.43, "depth": 28.01 },
        "sku": "RCH45Q1A"
    })
}

fn page_json(ids: &[u64], total: u64, skip: u64, limit: u64) -> Value {
    json!({
        "products": ids.iter().map(|id| product_json(*id)).collect::<Vec<_>>(),
        "total": total,
        "skip": skip,
        "limit": limit
    })
}

fn widget() -> AddProductData {
    AddProductData {
        title: "Widget".to_string(),
        brand: Some("Acme".to_string()),
        price: 9.99,
        stock: 5,
        category: "tools".to_string(),
        description: "x".to_string(),
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedBuf {
    type Writer = SharedBuf;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_all_products_requests_limit_zero() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("limit", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1, 2, 3], 3, 0, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .fetch_all_products(&CancellationToken::new())
        .await
        .expect("should parse all products");

    assert_eq!(page.products.len(), 3);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn fetch_products_unfiltered_page_uses_skip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("limit", "10"))
        .and(query_param("skip", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[21, 22], 194, 20, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .fetch_products(&ProductQuery::page(2), &CancellationToken::new())
        .await
        .expect("should parse page");

    assert_eq!(page.products[0].id, 21);
    assert_eq!(page.total, 194);
}

#[tokio::test]
async fn fetch_products_with_search_ignores_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/search"))
        .and(query_param("q", "mascara"))
        .and(query_param("limit", "10"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[1], 1, 0, 10)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/category/beauty"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let query = ProductQuery::page(0)
        .with_search("mascara")
        .with_category("beauty");
    let page = client
        .fetch_products(&query, &CancellationToken::new())
        .await
        .expect("search branch should be used");

    assert_eq!(page.total, 1, "total should be the filtered total");
}

#[tokio::test]
async fn fetch_products_by_category_uses_category_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/category/beauty"))
        .and(query_param("limit", "10"))
        .and(query_param("skip", "10"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[11], 15, 10, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .fetch_products(
            &ProductQuery::page(1).with_category("beauty"),
            &CancellationToken::new(),
        )
        .await
        .expect("category branch should be used");

    assert_eq!(page.total, 15);
}

#[tokio::test]
async fn string_price_is_validation_failure_on_every_listing() {
    let server = MockServer::start().await;

    let mut body = page_json(&[1], 1, 0, 10);
    body["products"][0]["price"] = json!("9.99");

    for listing_path in ["/products", "/products/search", "/products/category/beauty"] {
        Mock::given(method("GET"))
            .and(path(listing_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;
    }

    let client = test_client(&server.uri());
    let cancel = CancellationToken::new();
    let search = ProductQuery::page(0).with_search("phone");
    let category = ProductQuery::page(0).with_category("beauty");

    let failures = vec![
        (
            DummyJsonClient::all_products_key(),
            client.fetch_all_products(&cancel).await,
        ),
        (
            DummyJsonClient::products_key(&ProductQuery::page(0)),
            client.fetch_products(&ProductQuery::page(0), &cancel).await,
        ),
        (
            DummyJsonClient::products_key(&search),
            client.fetch_products(&search, &cancel).await,
        ),
        (
            DummyJsonClient::products_key(&category),
            client.fetch_products(&category, &cancel).await,
        ),
    ];

    for (key, result) in failures {
        let err = result.expect_err("string price must be rejected");
        assert_eq!(err.kind(), FailureKind::Validation, "{key}");
        assert!(!err.is_retriable());
        let violations = err.validation().expect("validation details");
        assert!(violations.mentions("price"), "{key}: {violations}");
        match err {
            ApiError::Validation { context, .. } => assert_eq!(context, key.to_string()),
            other => panic!("expected ApiError::Validation, got: {other:?}"),
        }
    }
}

#[test]
fn read_operations_have_distinct_stable_keys() {
    let query = ProductQuery::page(2).with_category("beauty");
    let keys = [
        DummyJsonClient::all_products_key(),
        DummyJsonClient::products_key(&query),
        DummyJsonClient::categories_key(),
        DummyJsonClient::orders_key(),
    ];

    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
            assert_ne!(a.to_string(), b.to_string());
        }
    }
    assert_eq!(
        DummyJsonClient::products_key(&query),
        DummyJsonClient::products_key(&query.clone())
    );
}

#[tokio::test]
async fn non_json_body_is_validation_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/carts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_orders(&CancellationToken::new())
        .await
        .expect_err("html must be rejected");

    assert_eq!(err.kind(), FailureKind::Validation);
}

// ---------------------------------------------------------------------------
// Categories and orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_categories_returns_parsed_list() {
    let server = MockServer::start().await;

    let body = json!([
        { "slug": "beauty", "name": "Beauty", "url": "https://dummyjson.com/products/category/beauty" },
        { "slug": "fragrances", "name": "Fragrances", "url": "https://dummyjson.com/products/category/fragrances" }
    ]);

    Mock::given(method("GET"))
        .and(path("/products/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let categories = client
        .fetch_categories(&CancellationToken::new())
        .await
        .expect("should parse categories");

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].slug, "beauty");
    assert_eq!(categories[1].name, "Fragrances");
}

#[tokio::test]
async fn fetch_orders_returns_carts_page() {
    let server = MockServer::start().await;

    let body = json!({
        "carts": [{
            "id": 1,
            "products": [{
                "id": 144,
                "title": "Cricket Helmet",
                "price": 44.99,
                "quantity": 4,
                "total": 179.96,
                "discountPercentage": 11.47,
                "discountedTotal": 159.32,
                "thumbnail": "https://cdn.dummyjson.com/products/images/sports-accessories/thumbnail.png"
            }],
            "total": 179.96,
            "discountedTotal": 159.32,
            "userId": 142,
            "totalProducts": 1,
            "totalQuantity": 4
        }],
        "total": 50,
        "skip": 0,
        "limit": 30
    });

    Mock::given(method("GET"))
        .and(path("/carts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let orders = client
        .fetch_orders(&CancellationToken::new())
        .await
        .expect("should parse carts");

    assert_eq!(orders.carts.len(), 1);
    assert_eq!(orders.carts[0].user_id, 142);
    assert_eq!(orders.total, 50);
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_product_posts_writable_subset_and_synthesizes_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/add"))
        .and(body_json(json!({
            "title": "Widget",
            "brand": "Acme",
            "price": 9.99,
            "stock": 5,
            "category": "tools",
            "description": "x"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 101 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let product = client
        .add_product(&widget(), &CancellationToken::new())
        .await
        .expect("create should succeed");

    assert_eq!(product.id, 101);
    assert_eq!(product.title, "Widget");
    assert_eq!(product.brand.as_deref(), Some("Acme"));
    assert_eq!(product.stock, 5);
    assert_eq!(product.category, "tools");
    assert_eq!(product.description, "x");
    assert!(product.rating.abs() < f64::EPSILON);
    assert!(product.discount_percentage.abs() < f64::EPSILON);
    assert!(product.images.is_empty());
    assert!(product.reviews.is_empty());
    assert!(product.dimensions.width.abs() < f64::EPSILON);
    assert!(product.dimensions.height.abs() < f64::EPSILON);
    assert!(product.dimensions.depth.abs() < f64::EPSILON);
    assert_eq!(product.thumbnail, PLACEHOLDER_THUMBNAIL);
}

#[tokio::test]
async fn add_product_without_id_in_response_is_validation_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/add"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "title": "Widget" })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .add_product(&widget(), &CancellationToken::new())
        .await
        .expect_err("missing id must be rejected");

    assert!(err.validation().is_some_and(|v| v.mentions("id")));
}

#[tokio::test]
async fn update_product_strips_id_from_body_and_returns_echo() {
    let server = MockServer::start().await;

    let product = parse_product(&product_json(42)).expect("fixture is valid");
    let mut expected_body = serde_json::to_value(&product).unwrap();
    expected_body.as_object_mut().unwrap().remove("id");

    Mock::given(method("PUT"))
        .and(path("/products/42"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(42)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let updated = client
        .update_product(&product, &CancellationToken::new())
        .await
        .expect("update should succeed");

    assert_eq!(updated.id, 42);
    assert_eq!(updated, product);
}

#[tokio::test]
async fn delete_product_returns_id_regardless_of_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/products/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not even json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let deleted = client
        .delete_product(42, &CancellationToken::new())
        .await
        .expect("2xx delete should succeed");

    assert_eq!(deleted.id, 42);
}

#[tokio::test]
async fn cached_first_page_follows_mutations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            30,
            0,
            10,
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products/add"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 101 })))
        .mount(&server)
        .await;
    let mut renamed = product_json(3);
    renamed["title"] = json!("Renamed Mascara");
    Mock::given(method("PUT"))
        .and(path("/products/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(renamed))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/products/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let cancel = CancellationToken::new();
    let mut page = client
        .fetch_products(&ProductQuery::page(0), &cancel)
        .await
        .expect("first page");

    let created = client.add_product(&widget(), &cancel).await.expect("add");
    page.insert_created(created);
    assert_eq!(page.products.len(), 10);
    assert_eq!(page.products[0].id, 101);
    assert!(page.products.iter().all(|p| p.id != 10));

    let mut edit = page.products[3].clone();
    assert_eq!(edit.id, 3);
    edit.title = "Renamed Mascara".to_string();
    let updated = client.update_product(&edit, &cancel).await.expect("update");
    assert!(page.replace_updated(updated));
    assert_eq!(page.products[3].title, "Renamed Mascara");

    let deleted = client.delete_product(5, &cancel).await.expect("delete");
    assert!(page.remove_deleted(deleted));
    assert!(!page.remove_deleted(deleted));
    assert_eq!(page.products.len(), 9);
}

#[tokio::test]
async fn delete_logs_request_and_transport_failure() {
    let logs = SharedBuf::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let err = test_client(&uri)
        .delete_product(7, &CancellationToken::new())
        .await
        .expect_err("nothing is listening");
    assert_eq!(err.kind(), FailureKind::Transport);

    let output = logs.contents();
    assert!(output.contains("DEBUG") && output.contains("DELETE"), "{output}");
    assert!(output.contains("/products/7"), "{output}");
    assert!(
        output.contains("WARN") && output.contains("request failed"),
        "{output}"
    );
}

// ---------------------------------------------------------------------------
// Transport failures and cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_2xx_status_is_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/products/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .delete_product(999, &CancellationToken::new())
        .await
        .expect_err("404 must fail");

    match err {
        ApiError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("expected ApiError::Status, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_retriable_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/categories"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_categories(&CancellationToken::new())
        .await
        .expect_err("503 must fail");

    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(err.is_retriable());
}

#[tokio::test]
async fn unreachable_server_is_transport_failure_for_every_operation() {
    // Bind then drop a server so its port refuses connections.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let client = test_client(&uri);
    let cancel = CancellationToken::new();
    let product = parse_product(&product_json(1)).unwrap();

    let errors = vec![
        client.fetch_all_products(&cancel).await.unwrap_err(),
        client
            .fetch_products(&ProductQuery::page(0), &cancel)
            .await
            .unwrap_err(),
        client.add_product(&widget(), &cancel).await.unwrap_err(),
        client.update_product(&product, &cancel).await.unwrap_err(),
        client.delete_product(1, &cancel).await.unwrap_err(),
        client.fetch_categories(&cancel).await.unwrap_err(),
        client.fetch_orders(&cancel).await.unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.kind(), FailureKind::Transport, "got: {err:?}");
        assert!(err.validation().is_none());
    }
}

#[tokio::test]
async fn cancellation_stops_waiting_on_slow_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(&[1], 1, 0, 10))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client
        .fetch_products(&ProductQuery::page(0), &cancel)
        .await
        .expect_err("cancelled call must not succeed");

    assert!(matches!(err, ApiError::Cancelled), "got: {err:?}");
    assert_eq!(err.kind(), FailureKind::Cancelled);
}

#[tokio::test]
async fn pre_cancelled_token_short_circuits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/carts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client.fetch_orders(&cancel).await.unwrap_err();
    assert!(matches!(err, ApiError::Cancelled));
}
