//! Backend API surface: endpoint registry, wire types, errors, and the
//! HTTP client that ties them together.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::{ApiError, ApiErrorKind};
