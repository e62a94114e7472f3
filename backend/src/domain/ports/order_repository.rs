//! Driven port for order persistence.

use async_trait::async_trait;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::auth::AccountId;
use crate::domain::order::{Order, OrderStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order persistence.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "order store connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "order store query failed: {message}",
    }
}

/// Filters applied to the admin order listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderPageFilter {
    /// Restrict to one status.
    pub status: Option<OrderStatus>,
    /// Whether to list archived (true) or live (false) orders.
    pub archived: bool,
}

/// Port for order persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order.
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    /// Fetch one order.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>, OrderRepositoryError>;

    /// Fetch one page of orders matching `filter`, newest first, plus the
    /// total match count.
    async fn page(
        &self,
        filter: &OrderPageFilter,
        request: &PageRequest,
    ) -> Result<(Vec<Order>, u64), OrderRepositoryError>;

    /// All orders placed by `account`, newest first.
    async fn list_for_account(
        &self,
        account: &AccountId,
    ) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Every archived order, newest first, for export.
    async fn list_archived(&self) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Replace an existing order row. Returns false when the id is unknown.
    async fn update(&self, order: &Order) -> Result<bool, OrderRepositoryError>;

    /// Delete an order. Returns false when the id is unknown. Stock is NOT
    /// restored by deletion.
    async fn delete(&self, id: &Uuid) -> Result<bool, OrderRepositoryError>;
}

/// Fixture implementation for tests that do not exercise orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderRepository;

#[async_trait]
impl OrderRepository for FixtureOrderRepository {
    async fn insert(&self, _order: &Order) -> Result<(), OrderRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(None)
    }

    async fn page(
        &self,
        _filter: &OrderPageFilter,
        _request: &PageRequest,
    ) -> Result<(Vec<Order>, u64), OrderRepositoryError> {
        Ok((Vec::new(), 0))
    }

    async fn list_for_account(
        &self,
        _account: &AccountId,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_archived(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(Vec::new())
    }

    async fn update(&self, _order: &Order) -> Result<bool, OrderRepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _id: &Uuid) -> Result<bool, OrderRepositoryError> {
        Ok(false)
    }
}
