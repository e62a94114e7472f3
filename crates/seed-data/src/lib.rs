//! Deterministic demo data for the Sakura Carts storefront.
//!
//! This crate provides the curated demo catalogue (products across the eight
//! storefront categories, prices in minor units) and reproducible demo
//! accounts generated from a numeric seed. It is independent of backend
//! domain types to avoid circular dependencies; the backend validates and
//! converts seeds at its own boundary.
//!
//! # Example
//!
//! ```
//! use seed_data::{demo_catalogue, generate_demo_accounts};
//!
//! let products = demo_catalogue();
//! assert!(!products.is_empty());
//!
//! let accounts = generate_demo_accounts(42, 3).expect("generation succeeds");
//! assert_eq!(accounts.len(), 4); // admin + 3 customers
//!
//! // Same seed produces identical accounts.
//! let again = generate_demo_accounts(42, 3).expect("generation succeeds");
//! assert_eq!(accounts, again);
//! ```

mod accounts;
mod catalogue;
mod error;

pub use accounts::{AccountSeed, RoleSeed, generate_demo_accounts};
pub use catalogue::{CATEGORIES, ProductSeed, demo_catalogue, is_known_category};
pub use error::GenerationError;
