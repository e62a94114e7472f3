//! Driven port for catalogue persistence and stock reservation.
//!
//! Stock reservation is an atomic conditional decrement: the adapter must
//! only decrement when enough stock remains, reporting whether the
//! reservation happened. This closes the check-then-act window between
//! validating a cart and reserving its lines.

use async_trait::async_trait;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::catalog::{Category, Product};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue persistence.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "product store connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "product store query failed: {message}",
    }
}

/// Sort order for catalogue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Alphabetical by name.
    Name,
}

/// Filters applied to a catalogue page query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPageFilter {
    /// Restrict to one category.
    pub category: Option<Category>,
    /// Case-insensitive name substring.
    pub search: Option<String>,
    /// Only featured products.
    pub featured_only: bool,
    /// Sort order.
    pub sort: ProductSort,
}

/// Outcome of an atomic stock reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockReservation {
    /// Stock was decremented by the requested quantity.
    Reserved,
    /// Not enough stock remained; nothing was changed.
    Insufficient,
}

/// Port for catalogue persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch one product.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, ProductRepositoryError>;

    /// Fetch one page of products matching `filter`, plus the total match
    /// count.
    async fn page(
        &self,
        filter: &ProductPageFilter,
        request: &PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductRepositoryError>;

    /// Persist a new product.
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError>;

    /// Replace an existing product row. Returns false when the id is
    /// unknown.
    async fn update(&self, product: &Product) -> Result<bool, ProductRepositoryError>;

    /// Delete a product. Returns false when the id is unknown.
    async fn delete(&self, id: &Uuid) -> Result<bool, ProductRepositoryError>;

    /// Atomically decrement stock by `quantity` when at least that much
    /// remains. Unknown ids report [`StockReservation::Insufficient`]; the
    /// caller distinguishes via [`ProductRepository::find_by_id`].
    async fn reserve_stock(
        &self,
        id: &Uuid,
        quantity: u32,
    ) -> Result<StockReservation, ProductRepositoryError>;

    /// Return previously reserved stock, compensating a failed placement.
    async fn release_stock(&self, id: &Uuid, quantity: u32)
    -> Result<(), ProductRepositoryError>;
}

/// Fixture implementation for tests that do not exercise the catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProductRepository;

#[async_trait]
impl ProductRepository for FixtureProductRepository {
    async fn find_by_id(&self, _id: &Uuid) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn page(
        &self,
        _filter: &ProductPageFilter,
        _request: &PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductRepositoryError> {
        Ok((Vec::new(), 0))
    }

    async fn insert(&self, _product: &Product) -> Result<(), ProductRepositoryError> {
        Ok(())
    }

    async fn update(&self, _product: &Product) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _id: &Uuid) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }

    async fn reserve_stock(
        &self,
        _id: &Uuid,
        _quantity: u32,
    ) -> Result<StockReservation, ProductRepositoryError> {
        Ok(StockReservation::Insufficient)
    }

    async fn release_stock(
        &self,
        _id: &Uuid,
        _quantity: u32,
    ) -> Result<(), ProductRepositoryError> {
        Ok(())
    }
}
