//! PostgreSQL-backed `OrderRepository` implementation using Diesel.
//!
//! Line items are stored as a JSONB snapshot array; shipping fields are
//! plain columns so admin edits stay cheap to index and query.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::auth::AccountId;
use crate::domain::money::Amount;
use crate::domain::order::{LineItem, Order, OrderStatus, ShippingInfo};
use crate::domain::ports::{OrderPageFilter, OrderRepository, OrderRepositoryError};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewOrderRow, OrderChangeset, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::orders;

/// Diesel-backed implementation of the order repository port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

fn serialize_items(order: &Order) -> Result<serde_json::Value, OrderRepositoryError> {
    serde_json::to_value(&order.items)
        .map_err(|err| OrderRepositoryError::query(format!("serialise line items: {err}")))
}

/// Convert a database row into a validated domain order.
fn row_to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    let OrderRow {
        id,
        account_id,
        items,
        full_name,
        email,
        address,
        city,
        postal_code,
        country,
        total_cents,
        status,
        archived,
        created_at,
        updated_at,
    } = row;

    let items: Vec<LineItem> = serde_json::from_value(items)
        .map_err(|err| OrderRepositoryError::query(format!("decode line items for {id}: {err}")))?;
    let total_amount = Amount::from_cents(total_cents)
        .map_err(|invalid| OrderRepositoryError::query(format!("total for {id}: {invalid}")))?;
    let status = OrderStatus::from_str(&status)
        .map_err(|invalid| OrderRepositoryError::query(format!("status for {id}: {invalid}")))?;

    Ok(Order {
        id,
        account_id: AccountId::from_uuid(account_id),
        items,
        shipping_info: ShippingInfo {
            full_name,
            email,
            address,
            city,
            postal_code,
            country,
        },
        total_amount,
        status,
        archived,
        created_at,
        updated_at,
    })
}

fn page_window(request: &PageRequest) -> (i64, i64) {
    (
        i64::try_from(request.offset()).unwrap_or(i64::MAX),
        i64::try_from(request.limit()).unwrap_or(i64::MAX),
    )
}

/// Apply the admin listing filters to an already-boxed query.
macro_rules! apply_filters {
    ($query:expr, $filter:expr) => {{
        let mut query = $query.filter(orders::archived.eq($filter.archived));
        if let Some(status) = $filter.status {
            query = query.filter(orders::status.eq(status.as_str()));
        }
        query
    }};
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let items = serialize_items(order)?;
        let row = NewOrderRow {
            id: order.id,
            account_id: *order.account_id.as_uuid(),
            items: &items,
            full_name: &order.shipping_info.full_name,
            email: &order.shipping_info.email,
            address: &order.shipping_info.address,
            city: &order.shipping_info.city,
            postal_code: &order.shipping_info.postal_code,
            country: &order.shipping_info.country,
            total_cents: order.total_amount.cents(),
            status: order.status.as_str(),
            archived: order.archived,
            created_at: order.created_at,
            updated_at: order.updated_at,
        };
        diesel::insert_into(orders::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_order).transpose()
    }

    async fn page(
        &self,
        filter: &OrderPageFilter,
        request: &PageRequest,
    ) -> Result<(Vec<Order>, u64), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count_query = apply_filters!(
            orders::table.select(diesel::dsl::count_star()).into_boxed(),
            filter
        );
        let total: i64 = count_query
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (offset, limit) = page_window(request);
        let rows_query = apply_filters!(
            orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .into_boxed(),
            filter
        );
        let rows: Vec<OrderRow> = rows_query
            .offset(offset)
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_order)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, u64::try_from(total).unwrap_or(0)))
    }

    async fn list_for_account(
        &self,
        account: &AccountId,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::account_id.eq(account.as_uuid()))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_order).collect()
    }

    async fn list_archived(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::archived.eq(true))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_order).collect()
    }

    async fn update(&self, order: &Order) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = OrderChangeset {
            full_name: &order.shipping_info.full_name,
            email: &order.shipping_info.email,
            address: &order.shipping_info.address,
            city: &order.shipping_info.city,
            postal_code: &order.shipping_info.postal_code,
            country: &order.shipping_info.country,
            status: order.status.as_str(),
            archived: order.archived,
            updated_at: order.updated_at,
        };
        let updated = diesel::update(orders::table.filter(orders::id.eq(order.id)))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(orders::table.filter(orders::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted == 1)
    }
}
