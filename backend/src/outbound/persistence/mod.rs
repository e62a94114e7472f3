//! PostgreSQL persistence adapters implementing the driven ports.

mod diesel_account_adapters;
mod diesel_message_repository;
mod diesel_order_repository;
mod diesel_product_repository;
mod error_mapping;
pub mod migrations;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_account_adapters::{DieselAccountAdapters, password_digest};
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
