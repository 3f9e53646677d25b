use serde_json::Value;

use super::rules;
use super::types::{
    AddProductData, Cart, CartProduct, CartsPage, Category, Dimensions, Product, ProductsPage,
    Review,
};
use super::violation::{child_path, Checker, ValidationError, ROOT};

/// Parses a single product, including its nested reviews and dimensions.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every violated field.
pub fn parse_product(value: &Value) -> Result<Product, ValidationError> {
    let mut cx = Checker::default();
    let product = product_at(&mut cx, ROOT, value);
    cx.finish(product)
}

/// Parses a `{products, total, skip, limit}` listing envelope.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every violated field across all products.
pub fn parse_products_page(value: &Value) -> Result<ProductsPage, ValidationError> {
    let mut cx = Checker::default();
    let page = products_page_at(&mut cx, value);
    cx.finish(page)
}

/// # Errors
///
/// Returns [`ValidationError`] listing every violated field.
pub fn parse_review(value: &Value) -> Result<Review, ValidationError> {
    let mut cx = Checker::default();
    let review = review_at(&mut cx, ROOT, value);
    cx.finish(review)
}

/// # Errors
///
/// Returns [`ValidationError`] listing every violated field.
pub fn parse_dimensions(value: &Value) -> Result<Dimensions, ValidationError> {
    let mut cx = Checker::default();
    let dimensions = dimensions_at(&mut cx, ROOT, value);
    cx.finish(dimensions)
}

/// # Errors
///
/// Returns [`ValidationError`] listing every violated field.
pub fn parse_category(value: &Value) -> Result<Category, ValidationError> {
    let mut cx = Checker::default();
    let category = category_at(&mut cx, ROOT, value);
    cx.finish(category)
}

/// Parses a bare JSON array of categories.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every violated field.
pub fn parse_categories(value: &Value) -> Result<Vec<Category>, ValidationError> {
    let mut cx = Checker::default();
    let categories = cx.list(ROOT, value, category_at);
    cx.finish(categories)
}

/// # Errors
///
/// Returns [`ValidationError`] listing every violated field.
pub fn parse_cart(value: &Value) -> Result<Cart, ValidationError> {
    let mut cx = Checker::default();
    let cart = cart_at(&mut cx, ROOT, value);
    cx.finish(cart)
}

/// Parses a `{carts, total, skip, limit}` envelope.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every violated field across all carts.
pub fn parse_carts_page(value: &Value) -> Result<CartsPage, ValidationError> {
    let mut cx = Checker::default();
    let page = carts_page_at(&mut cx, value);
    cx.finish(page)
}

/// Parses the writable product subset submitted from a create form.
///
/// Applies the same title, price, and stock rules as [`parse_product`]; any
/// other keys in `value` are ignored.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every violated field.
pub fn parse_add_product(value: &Value) -> Result<AddProductData, ValidationError> {
    let mut cx = Checker::default();
    let data = add_product_at(&mut cx, ROOT, value);
    cx.finish(data)
}

/// Extracts the server-assigned `id` from a create acknowledgement.
///
/// # Errors
///
/// Returns [`ValidationError`] if `id` is missing or not a non-negative integer.
pub fn parse_created_id(value: &Value) -> Result<u64, ValidationError> {
    let mut cx = Checker::default();
    let id = cx
        .object(ROOT, value)
        .and_then(|map| cx.unsigned(map, "id"));
    cx.finish(id)
}

fn product_at(cx: &mut Checker, path: &str, value: &Value) -> Option<Product> {
    let map = cx.object(path, value)?;
    let field = |key: &str| child_path(path, key);

    let id = cx.unsigned(map, &field("id"));
    let title = rules::title(cx, map, path);
    let description = rules::description(cx, map, path);
    let price = rules::price(cx, map, path);
    let discount_percentage = cx.number(map, &field("discountPercentage"));
    let rating = cx.number(map, &field("rating"));
    let stock = rules::stock(cx, map, path);
    let brand = rules::brand(cx, map, path);
    let category = rules::category(cx, map, path);
    let thumbnail = rules::url_field(cx, map, &field("thumbnail"));
    let images = cx.list_field(map, &field("images"), rules::url);
    let reviews = cx.list_field(map, &field("reviews"), review_at);
    let dimensions = cx
        .required(map, &field("dimensions"))
        .and_then(|v| dimensions_at(cx, &field("dimensions"), v));

    Some(Product {
        id: id?,
        title: title?,
        description: description?,
        price: price?,
        discount_percentage: discount_percentage?,
        rating: rating?,
        stock: stock?,
        brand: brand.ok()?,
        category: category?,
        thumbnail: thumbnail?,
        images: images?,
        reviews: reviews?,
        dimensions: dimensions?,
    })
}

fn products_page_at(cx: &mut Checker, value: &Value) -> Option<ProductsPage> {
    let map = cx.object(ROOT, value)?;
    let products = cx.list_field(map, "products", product_at);
    let total = cx.unsigned(map, "total");
    let skip = cx.unsigned(map, "skip");
    let limit = cx.unsigned(map, "limit");

    Some(ProductsPage {
        products: products?,
        total: total?,
        skip: skip?,
        limit: limit?,
    })
}

fn review_at(cx: &mut Checker, path: &str, value: &Value) -> Option<Review> {
    let map = cx.object(path, value)?;
    let field = |key: &str| child_path(path, key);

    let rating = rules::review_rating(cx, map, &field("rating"));
    let comment = cx.string(map, &field("comment"));
    let date = rules::datetime_field(cx, map, &field("date"));
    let reviewer_name = cx.string(map, &field("reviewerName"));
    let reviewer_email = rules::email_field(cx, map, &field("reviewerEmail"));

    Some(Review {
        rating: rating?,
        comment: comment?,
        date: date?,
        reviewer_name: reviewer_name?,
        reviewer_email: reviewer_email?,
    })
}

fn dimensions_at(cx: &mut Checker, path: &str, value: &Value) -> Option<Dimensions> {
    let map = cx.object(path, value)?;
    let width = cx.number(map, &child_path(path, "width"));
    let height = cx.number(map, &child_path(path, "height"));
    let depth = cx.number(map, &child_path(path, "depth"));

    Some(Dimensions {
        width: width?,
        height: height?,
        depth: depth?,
    })
}

fn category_at(cx: &mut Checker, path: &str, value: &Value) -> Option<Category> {
    let map = cx.object(path, value)?;
    let slug = cx.string(map, &child_path(path, "slug"));
    let name = cx.string(map, &child_path(path, "name"));
    let url = rules::url_field(cx, map, &child_path(path, "url"));

    Some(Category {
        slug: slug?,
        name: name?,
        url: url?,
    })
}

fn cart_product_at(cx: &mut Checker, path: &str, value: &Value) -> Option<CartProduct> {
    let map = cx.object(path, value)?;
    let field = |key: &str| child_path(path, key);

    let id = cx.unsigned(map, &field("id"));
    let title = cx.string(map, &field("title"));
    let price = cx.number(map, &field("price"));
    let quantity = cx.unsigned(map, &field("quantity"));
    let total = cx.number(map, &field("total"));
    let discount_percentage = cx.number(map, &field("discountPercentage"));
    let discounted_total = cx.number(map, &field("discountedTotal"));
    let thumbnail = rules::url_field(cx, map, &field("thumbnail"));

    Some(CartProduct {
        id: id?,
        title: title?,
        price: price?,
        quantity: quantity?,
        total: total?,
        discount_percentage: discount_percentage?,
        discounted_total: discounted_total?,
        thumbnail: thumbnail?,
    })
}

fn cart_at(cx: &mut Checker, path: &str, value: &Value) -> Option<Cart> {
    let map = cx.object(path, value)?;
    let field = |key: &str| child_path(path, key);

    let id = cx.unsigned(map, &field("id"));
    let products = cx.list_field(map, &field("products"), cart_product_at);
    let total = cx.number(map, &field("total"));
    let discounted_total = cx.number(map, &field("discountedTotal"));
    let user_id = cx.unsigned(map, &field("userId"));
    let total_products = cx.unsigned(map, &field("totalProducts"));
    let total_quantity = cx.unsigned(map, &field("totalQuantity"));

    Some(Cart {
        id: id?,
        products: products?,
        total: total?,
        discounted_total: discounted_total?,
        user_id: user_id?,
        total_products: total_products?,
        total_quantity: total_quantity?,
    })
}

fn carts_page_at(cx: &mut Checker, value: &Value) -> Option<CartsPage> {
    let map = cx.object(ROOT, value)?;
    let carts = cx.list_field(map, "carts", cart_at);
    let total = cx.unsigned(map, "total");
    let skip = cx.unsigned(map, "skip");
    let limit = cx.unsigned(map, "limit");

    Some(CartsPage {
        carts: carts?,
        total: total?,
        skip: skip?,
        limit: limit?,
    })
}

fn add_product_at(cx: &mut Checker, path: &str, value: &Value) -> Option<AddProductData> {
    let map = cx.object(path, value)?;
    let title = rules::title(cx, map, path);
    let brand = rules::brand(cx, map, path);
    let price = rules::price(cx, map, path);
    let stock = rules::stock(cx, map, path);
    let category = rules::category(cx, map, path);
    let description = rules::description(cx, map, path);

    Some(AddProductData {
        title: title?,
        brand: brand.ok()?,
        price: price?,
        stock: stock?,
        category: category?,
        description: description?,
    })
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
