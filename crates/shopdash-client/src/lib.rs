pub mod client;
pub mod error;
pub mod listing;

pub use client::{DummyJsonClient, DEFAULT_BASE_URL, PLACEHOLDER_THUMBNAIL};
pub use error::{ApiError, FailureKind};
pub use listing::{select_listing, ListingRequest, ProductQuery, QueryKey, ALL_CATEGORIES};
pub use tokio_util::sync::CancellationToken;
