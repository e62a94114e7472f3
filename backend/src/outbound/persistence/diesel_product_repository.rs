//! PostgreSQL-backed `ProductRepository` implementation using Diesel.
//!
//! Stock reservation is pushed into SQL: `UPDATE ... SET stock = stock - n
//! WHERE id = ? AND stock >= n` decrements atomically, so two concurrent
//! checkouts can never jointly overdraw a product.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::catalog::{Category, Product};
use crate::domain::money::Amount;
use crate::domain::ports::{
    ProductPageFilter, ProductRepository, ProductRepositoryError, ProductSort, StockReservation,
};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProductRow, ProductChangeset, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::products;

/// Diesel-backed implementation of the product repository port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    map_basic_pool_error(error, ProductRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductRepositoryError {
    map_basic_diesel_error(
        error,
        ProductRepositoryError::query,
        ProductRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain product.
fn row_to_product(row: ProductRow) -> Result<Product, ProductRepositoryError> {
    let ProductRow {
        id,
        name,
        description,
        price_cents,
        image,
        category,
        stock,
        featured,
        created_at,
        updated_at,
    } = row;

    let price = Amount::from_cents(price_cents)
        .map_err(|invalid| ProductRepositoryError::query(format!("price for {id}: {invalid}")))?;
    let category = Category::from_str(&category)
        .map_err(|invalid| ProductRepositoryError::query(format!("category for {id}: {invalid}")))?;

    Ok(Product {
        id,
        name,
        description,
        price,
        image,
        category,
        stock,
        featured,
        created_at,
        updated_at,
    })
}

fn quantity_as_i32(quantity: u32) -> Result<i32, ProductRepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| ProductRepositoryError::query(format!("quantity {quantity} out of range")))
}

fn page_window(request: &PageRequest) -> (i64, i64) {
    (
        i64::try_from(request.offset()).unwrap_or(i64::MAX),
        i64::try_from(request.limit()).unwrap_or(i64::MAX),
    )
}

/// Apply the listing filters to an already-boxed query. A macro because the
/// row and count queries box to different select types.
macro_rules! apply_filters {
    ($query:expr, $filter:expr) => {{
        let mut query = $query;
        if let Some(category) = $filter.category {
            query = query.filter(products::category.eq(category.as_str()));
        }
        if let Some(search) = &$filter.search {
            query = query.filter(products::name.ilike(format!("%{search}%")));
        }
        if $filter.featured_only {
            query = query.filter(products::featured.eq(true));
        }
        query
    }};
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_product).transpose()
    }

    async fn page(
        &self,
        filter: &ProductPageFilter,
        request: &PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count_query = apply_filters!(
            products::table
                .select(diesel::dsl::count_star())
                .into_boxed(),
            filter
        );
        let total: i64 = count_query
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let base = products::table.select(ProductRow::as_select());
        let rows_query = match filter.sort {
            ProductSort::Newest => base
                .order((products::created_at.desc(), products::id.desc()))
                .into_boxed(),
            ProductSort::PriceAsc => base
                .order((products::price_cents.asc(), products::id.asc()))
                .into_boxed(),
            ProductSort::PriceDesc => base
                .order((products::price_cents.desc(), products::id.asc()))
                .into_boxed(),
            ProductSort::Name => base
                .order((products::name.asc(), products::id.asc()))
                .into_boxed(),
        };
        let (offset, limit) = page_window(request);
        let rows: Vec<ProductRow> = apply_filters!(rows_query, filter)
            .offset(offset)
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_product)
            .collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total).unwrap_or(0);
        Ok((items, total))
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewProductRow {
            id: product.id,
            name: &product.name,
            description: &product.description,
            price_cents: product.price.cents(),
            image: &product.image,
            category: product.category.as_str(),
            stock: product.stock,
            featured: product.featured,
            created_at: product.created_at,
            updated_at: product.updated_at,
        };
        diesel::insert_into(products::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, product: &Product) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = ProductChangeset {
            name: &product.name,
            description: &product.description,
            price_cents: product.price.cents(),
            image: &product.image,
            category: product.category.as_str(),
            stock: product.stock,
            featured: product.featured,
            updated_at: product.updated_at,
        };
        let updated = diesel::update(products::table.filter(products::id.eq(product.id)))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(products::table.filter(products::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted == 1)
    }

    async fn reserve_stock(
        &self,
        id: &Uuid,
        quantity: u32,
    ) -> Result<StockReservation, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let quantity = quantity_as_i32(quantity)?;
        let updated = diesel::update(
            products::table.filter(products::id.eq(id).and(products::stock.ge(quantity))),
        )
        .set(products::stock.eq(products::stock - quantity))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(if updated == 1 {
            StockReservation::Reserved
        } else {
            StockReservation::Insufficient
        })
    }

    async fn release_stock(
        &self,
        id: &Uuid,
        quantity: u32,
    ) -> Result<(), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let quantity = quantity_as_i32(quantity)?;
        diesel::update(products::table.filter(products::id.eq(id)))
            .set(products::stock.eq(products::stock + quantity))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
