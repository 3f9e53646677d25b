//! Domain layer for the shopdash admin dashboard: entity schemas and their
//! parse operations, page bookkeeping, dashboard aggregations, and
//! environment-driven configuration. Nothing in this crate performs I/O
//! beyond reading the process environment.

mod app_config;
mod config;
mod error;
pub mod insights;
pub mod paging;
pub mod schema;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use insights::{AnalyticsSummary, DashboardSummary, NamedValue, OrderRow, StockStatus};
pub use paging::{page_window, PageInfo, PAGE_SIZE};
pub use schema::{
    AddProductData, Cart, CartProduct, CartsPage, Category, DeletedProduct, Dimensions, Product,
    ProductsPage, Review, ValidationError, Violation,
};
