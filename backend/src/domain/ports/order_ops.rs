//! Driving ports for order placement, administration and retrieval.

use async_trait::async_trait;
use pagination::{PageEnvelope, PageRequest};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::auth::Account;
use crate::domain::order::{CartLine, Order, OrderStatus, ShippingInfo, ShippingInfoUpdate};

use super::order_repository::OrderPageFilter;

/// A checkout request: who is buying, what, and where it ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    /// The authenticated buyer.
    pub account: Account,
    /// Requested cart lines. Duplicate product ids are processed
    /// independently, each reserving stock on its own.
    pub lines: Vec<CartLine>,
    /// Validated destination details.
    pub shipping_info: ShippingInfo,
}

/// Mutations of the order store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Run the placement workflow: validate the cart, reserve stock,
    /// persist the order and open its chat thread.
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, Error>;

    /// Transition an order's status, appending the canned thread reply when
    /// the status actually changes. Same-status calls are no-ops.
    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> Result<Order, Error>;

    /// Flip the archived flag.
    async fn toggle_archive(&self, id: &Uuid) -> Result<Order, Error>;

    /// Merge a partial shipping edit into the stored destination.
    async fn update_shipping(
        &self,
        id: &Uuid,
        update: ShippingInfoUpdate,
    ) -> Result<Order, Error>;

    /// Hard-delete an order. Reserved stock is NOT restored.
    async fn delete_order(&self, id: &Uuid) -> Result<(), Error>;
}

/// Read side of the order store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// One page of orders for the admin console, newest first.
    async fn page(
        &self,
        filter: &OrderPageFilter,
        page: &PageRequest,
    ) -> Result<PageEnvelope<Order>, Error>;

    /// The caller's own orders, newest first.
    async fn orders_for_account(&self, account: &Account) -> Result<Vec<Order>, Error>;

    /// Fetch one order; owners see their own, admins see all.
    async fn get_order(&self, id: &Uuid, requester: &Account) -> Result<Order, Error>;

    /// Every archived order, for the export download.
    async fn export_archived(&self) -> Result<Vec<Order>, Error>;
}

/// Fixture order command rejecting every mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderCommand;

#[async_trait]
impl OrderCommand for FixtureOrderCommand {
    async fn place_order(&self, _request: PlaceOrderRequest) -> Result<Order, Error> {
        Err(Error::internal("fixture order store cannot place orders"))
    }

    async fn update_status(&self, id: &Uuid, _status: OrderStatus) -> Result<Order, Error> {
        Err(Error::not_found(format!("order {id} not found")))
    }

    async fn toggle_archive(&self, id: &Uuid) -> Result<Order, Error> {
        Err(Error::not_found(format!("order {id} not found")))
    }

    async fn update_shipping(
        &self,
        id: &Uuid,
        _update: ShippingInfoUpdate,
    ) -> Result<Order, Error> {
        Err(Error::not_found(format!("order {id} not found")))
    }

    async fn delete_order(&self, id: &Uuid) -> Result<(), Error> {
        Err(Error::not_found(format!("order {id} not found")))
    }
}

/// Fixture order query recognising no orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderQuery;

#[async_trait]
impl OrderQuery for FixtureOrderQuery {
    async fn page(
        &self,
        _filter: &OrderPageFilter,
        page: &PageRequest,
    ) -> Result<PageEnvelope<Order>, Error> {
        Ok(PageEnvelope::new(Vec::new(), page, 0))
    }

    async fn orders_for_account(&self, _account: &Account) -> Result<Vec<Order>, Error> {
        Ok(Vec::new())
    }

    async fn get_order(&self, id: &Uuid, _requester: &Account) -> Result<Order, Error> {
        Err(Error::not_found(format!("order {id} not found")))
    }

    async fn export_archived(&self) -> Result<Vec<Order>, Error> {
        Ok(Vec::new())
    }
}
