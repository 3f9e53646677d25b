use serde::Serialize;

/// Physical dimensions of a product. No invariant relates the three values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// A customer review attached to a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Star rating, 1 through 5 inclusive.
    pub rating: u8,
    pub comment: String,
    /// RFC 3339 UTC timestamp exactly as the service returned it.
    pub date: String,
    pub reviewer_name: String,
    pub reviewer_email: String,
}

/// A catalog product.
///
/// URL-typed fields keep the input string so a parsed product serializes
/// back to the same JSON it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub discount_percentage: f64,
    pub rating: f64,
    pub stock: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub category: String,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub reviews: Vec<Review>,
    pub dimensions: Dimensions,
}

/// One page of a product listing. `total` counts the filtered result set,
/// not the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// Writable subset of [`Product`] submitted when creating a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddProductData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: f64,
    pub stock: u64,
    pub category: String,
    pub description: String,
}

/// Acknowledgement of a successful delete, echoing the requested id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedProduct {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub url: String,
}

/// A line item inside a [`Cart`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub quantity: u64,
    pub total: f64,
    pub discount_percentage: f64,
    pub discounted_total: f64,
    pub thumbnail: String,
}

/// A shopping cart, shown in the dashboard as an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: u64,
    pub products: Vec<CartProduct>,
    pub total: f64,
    pub discounted_total: f64,
    pub user_id: u64,
    pub total_products: u64,
    pub total_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartsPage {
    pub carts: Vec<Cart>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}
