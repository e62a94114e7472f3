//! Driving ports for catalogue browsing and administration.

use async_trait::async_trait;
use pagination::{PageEnvelope, PageRequest};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::catalog::{Product, ProductDraft, ProductUpdate};

use super::product_repository::ProductPageFilter;

/// A catalogue page query: filters plus the pagination window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPageRequest {
    /// Listing filters and sort order.
    pub filter: ProductPageFilter,
    /// Pagination window.
    pub page: PageRequest,
}

/// Read side of the catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// One page of products matching the query.
    async fn list_products(
        &self,
        request: &ProductPageRequest,
    ) -> Result<PageEnvelope<Product>, Error>;

    /// Fetch one product or fail with `not_found`.
    async fn get_product(&self, id: &Uuid) -> Result<Product, Error>;
}

/// Admin mutations of the catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    /// Create a product from a validated draft.
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error>;

    /// Apply a partial update; replacing the image releases the old file.
    async fn update_product(&self, id: &Uuid, update: ProductUpdate) -> Result<Product, Error>;

    /// Delete a product and release its stored image.
    async fn delete_product(&self, id: &Uuid) -> Result<(), Error>;
}

/// Fixture catalogue query recognising no products.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogQuery;

#[async_trait]
impl CatalogQuery for FixtureCatalogQuery {
    async fn list_products(
        &self,
        request: &ProductPageRequest,
    ) -> Result<PageEnvelope<Product>, Error> {
        Ok(PageEnvelope::new(Vec::new(), &request.page, 0))
    }

    async fn get_product(&self, id: &Uuid) -> Result<Product, Error> {
        Err(Error::not_found(format!("product {id} not found")))
    }
}

/// Fixture catalogue command rejecting every mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogCommand;

#[async_trait]
impl CatalogCommand for FixtureCatalogCommand {
    async fn create_product(&self, _draft: ProductDraft) -> Result<Product, Error> {
        Err(Error::internal("fixture catalogue cannot create products"))
    }

    async fn update_product(&self, id: &Uuid, _update: ProductUpdate) -> Result<Product, Error> {
        Err(Error::not_found(format!("product {id} not found")))
    }

    async fn delete_product(&self, id: &Uuid) -> Result<(), Error> {
        Err(Error::not_found(format!("product {id} not found")))
    }
}
