//! Catalogue services: browsing for the shop, mutations for the console.
//!
//! Deleting or re-imaging a product releases the replaced stored file.
//! The release is best effort; failures are logged, never surfaced.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::PageEnvelope;
use tracing::warn;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::catalog::{Product, ProductDraft, ProductUpdate};
use crate::domain::ports::{
    CatalogCommand, CatalogQuery, FileStore, ProductPageRequest, ProductRepository,
};
use crate::domain::service_support::map_product_error;

fn not_found(id: &Uuid) -> Error {
    Error::not_found(format!("product {id} not found"))
}

/// Catalogue mutations for the admin console.
#[derive(Clone)]
pub struct CatalogCommandService<P, F> {
    products: Arc<P>,
    files: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<P, F> CatalogCommandService<P, F> {
    /// Create the service over catalogue persistence and file storage.
    pub fn new(products: Arc<P>, files: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self {
            products,
            files,
            clock,
        }
    }
}

impl<P, F> CatalogCommandService<P, F>
where
    P: ProductRepository,
    F: FileStore,
{
    async fn release_file(&self, reference: &str) {
        if let Err(remove_error) = self.files.remove(reference).await {
            warn!(%remove_error, reference, "failed to remove stored product image");
        }
    }
}

#[async_trait]
impl<P, F> CatalogCommand for CatalogCommandService<P, F>
where
    P: ProductRepository,
    F: FileStore,
{
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error> {
        let now = self.clock.utc();
        let product = Product {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image: draft.image,
            category: draft.category,
            stock: draft.stock,
            featured: draft.featured,
            created_at: now,
            updated_at: now,
        };
        self.products
            .insert(&product)
            .await
            .map_err(map_product_error)?;
        Ok(product)
    }

    async fn update_product(&self, id: &Uuid, update: ProductUpdate) -> Result<Product, Error> {
        let update = update
            .validated()
            .map_err(|invalid| Error::invalid_request(invalid.to_string()))?;
        let mut product = self
            .products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| not_found(id))?;

        let replaced_image = match &update.image {
            Some(image) if *image != product.image => Some(product.image.clone()),
            _ => None,
        };

        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(image) = update.image {
            product.image = image;
        }
        if let Some(category) = update.category {
            product.category = category;
        }
        if let Some(stock) = update.stock {
            product.stock = stock;
        }
        if let Some(featured) = update.featured {
            product.featured = featured;
        }
        product.updated_at = self.clock.utc();

        let updated = self
            .products
            .update(&product)
            .await
            .map_err(map_product_error)?;
        if !updated {
            return Err(not_found(id));
        }

        if let Some(old_image) = replaced_image {
            self.release_file(&old_image).await;
        }

        Ok(product)
    }

    async fn delete_product(&self, id: &Uuid) -> Result<(), Error> {
        let product = self
            .products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| not_found(id))?;
        let deleted = self
            .products
            .delete(id)
            .await
            .map_err(map_product_error)?;
        if !deleted {
            return Err(not_found(id));
        }
        self.release_file(&product.image).await;
        Ok(())
    }
}

/// Catalogue reads for the shop.
#[derive(Clone)]
pub struct CatalogQueryService<P> {
    products: Arc<P>,
}

impl<P> CatalogQueryService<P> {
    /// Create the service over catalogue persistence.
    pub fn new(products: Arc<P>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl<P> CatalogQuery for CatalogQueryService<P>
where
    P: ProductRepository,
{
    async fn list_products(
        &self,
        request: &ProductPageRequest,
    ) -> Result<PageEnvelope<Product>, Error> {
        let (products, total) = self
            .products
            .page(&request.filter, &request.page)
            .await
            .map_err(map_product_error)?;
        Ok(PageEnvelope::new(products, &request.page, total))
    }

    async fn get_product(&self, id: &Uuid) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
