//! Sakura Carts backend library.
//!
//! A storefront REST API: product catalogue, order placement with stock
//! reservation, order-status-driven chat threads, and a unified
//! admin/customer messaging store. Hexagonal layout: `domain` owns the
//! entities, services and ports; `inbound` and `outbound` adapt HTTP and
//! PostgreSQL to them.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::ApiDoc;
pub use middleware::Trace;
