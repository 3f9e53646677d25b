//! Schema registry for every entity the dashboard reads or writes.
//!
//! Each entity has a `parse_*` function that takes an untyped
//! [`serde_json::Value`] and returns either the typed entity or a
//! [`ValidationError`] listing every violated field. Parsing never coerces:
//! a string where a number belongs, a missing key, or an out-of-range value
//! is always a violation. Unknown keys are ignored.

mod parse;
mod rules;
mod types;
mod violation;

pub use parse::{
    parse_add_product, parse_cart, parse_carts_page, parse_categories, parse_category,
    parse_created_id, parse_dimensions, parse_product, parse_products_page, parse_review,
};
pub use types::{
    AddProductData, Cart, CartProduct, CartsPage, Category, DeletedProduct, Dimensions, Product,
    ProductsPage, Review,
};
pub use violation::{Constraint, ValidationError, Violation};
