//! Order workflow services: placement with stock reservation, status
//! transitions with thread sync, and admin bookkeeping.
//!
//! Placement is the one multi-step write in the system. The sequence is:
//! resolve every product (no effects yet), validate every line against read
//! stock so shortages are reported in aggregate, then reserve line by line
//! with an atomic conditional decrement. A reservation that loses a race,
//! or an order insert that fails, releases every decrement already made.
//! That release is a compensating action, not a transaction: a crash
//! between reserve and insert still leaks the reservation.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageEnvelope, PageRequest};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::auth::Account;
use crate::domain::message::{AuthorRole, Message, MessageDraft, Reply, SHOP_AUTHOR_NAME};
use crate::domain::order::{
    LineItem, Order, OrderStatus, ShippingInfoUpdate, total_of,
};
use crate::domain::ports::{
    MessageRepository, OrderCommand, OrderPageFilter, OrderQuery, OrderRepository,
    PlaceOrderRequest, ProductRepository, StockReservation,
};
use crate::domain::service_support::{map_order_error, map_product_error};

/// One cart line that could not be satisfied from stock.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ShortLine {
    product_id: Uuid,
    name: String,
    available: i32,
    requested: u32,
}

fn insufficient_stock_error(short: &[ShortLine]) -> Error {
    let listing = short
        .iter()
        .map(|line| {
            format!(
                "{} ({} available, {} requested)",
                line.name, line.available, line.requested
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let details = short
        .iter()
        .map(|line| {
            json!({
                "productId": line.product_id,
                "name": line.name,
                "available": line.available,
                "requested": line.requested,
            })
        })
        .collect::<Vec<_>>();
    Error::insufficient_stock(format!("Insufficient stock: {listing}"))
        .with_details(json!({ "items": details }))
}

/// Order mutations: the placement and status workflows.
#[derive(Clone)]
pub struct OrderCommandService<P, O, M> {
    products: Arc<P>,
    orders: Arc<O>,
    messages: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<P, O, M> OrderCommandService<P, O, M> {
    /// Create the service over catalogue, order and message persistence.
    pub fn new(
        products: Arc<P>,
        orders: Arc<O>,
        messages: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            orders,
            messages,
            clock,
        }
    }
}

impl<P, O, M> OrderCommandService<P, O, M>
where
    P: ProductRepository,
    O: OrderRepository,
    M: MessageRepository,
{
    /// Best-effort compensation: return every reservation in `reserved`.
    /// Failures are logged, never propagated.
    async fn release_reserved(&self, reserved: &[(Uuid, u32)]) {
        for (product_id, quantity) in reserved {
            if let Err(release_error) = self.products.release_stock(product_id, *quantity).await {
                error!(
                    %release_error,
                    product_id = %product_id,
                    quantity,
                    "failed to release reserved stock during rollback"
                );
            }
        }
    }

    /// Open the order chat thread. Failure is non-fatal to placement: the
    /// order already exists, so the error is logged and swallowed and the
    /// order simply has no thread.
    async fn open_order_thread(&self, account: &Account, order: &Order) {
        let body = match order.summary_body() {
            Ok(body) => body,
            Err(overflow) => {
                warn!(%overflow, order_id = %order.id, "could not render order summary");
                return;
            }
        };
        let draft = match MessageDraft::order_thread(
            &order.shipping_info.full_name,
            account.email.clone(),
            order.id,
            order.thread_subject(),
            body,
        ) {
            Ok(draft) => draft,
            Err(invalid) => {
                warn!(%invalid, order_id = %order.id, "could not build order thread draft");
                return;
            }
        };
        let thread = Message::from_draft(draft, Uuid::new_v4(), self.clock.utc());
        if let Err(insert_error) = self.messages.insert(&thread).await {
            warn!(
                %insert_error,
                order_id = %order.id,
                "failed to create order thread; order placed without chat"
            );
        }
    }

    /// Append the canned status reply to the order's thread, if one exists.
    /// Threads are correlated by the explicit order reference; a missing
    /// thread is skipped silently.
    async fn append_status_reply(&self, order: &Order, status: OrderStatus) {
        let thread = match self.messages.find_by_order_id(&order.id).await {
            Ok(Some(thread)) => thread,
            Ok(None) => return,
            Err(lookup_error) => {
                warn!(%lookup_error, order_id = %order.id, "order thread lookup failed");
                return;
            }
        };
        let now = self.clock.utc();
        let reply = match Reply::new(
            &status.thread_reply(&order.short_id()),
            AuthorRole::Admin,
            SHOP_AUTHOR_NAME,
            now,
        ) {
            Ok(reply) => reply,
            Err(invalid) => {
                warn!(%invalid, order_id = %order.id, "could not build status reply");
                return;
            }
        };
        if let Err(append_error) = self
            .messages
            .append_reply(&thread.id, &reply, false, now)
            .await
        {
            warn!(%append_error, order_id = %order.id, "failed to append status reply");
        }
    }

    async fn load_order(&self, id: &Uuid) -> Result<Order, Error> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))
    }

    async fn persist_update(&self, order: &Order) -> Result<(), Error> {
        let updated = self.orders.update(order).await.map_err(map_order_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::not_found(format!("order {} not found", order.id)))
        }
    }
}

#[async_trait]
impl<P, O, M> OrderCommand for OrderCommandService<P, O, M>
where
    P: ProductRepository,
    O: OrderRepository,
    M: MessageRepository,
{
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, Error> {
        let PlaceOrderRequest {
            account,
            lines,
            shipping_info,
        } = request;

        if lines.is_empty() {
            return Err(Error::invalid_request("order must contain at least one item"));
        }
        for (index, line) in lines.iter().enumerate() {
            if line.quantity == 0 {
                return Err(Error::invalid_request("item quantity must be at least 1")
                    .with_details(json!({ "field": "items", "index": index })));
            }
        }

        // Resolve every product before touching anything. Duplicate product
        // ids stay as separate lines; each reserves stock independently.
        let mut resolved = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = self
                .products
                .find_by_id(&line.product_id)
                .await
                .map_err(map_product_error)?
                .ok_or_else(|| {
                    Error::not_found(format!("product {} not found", line.product_id))
                })?;
            resolved.push((line, product));
        }

        // Aggregate validation against read stock: report every short line,
        // not just the first, before reserving anything.
        let short: Vec<ShortLine> = resolved
            .iter()
            .filter(|(line, product)| i64::from(product.stock) < i64::from(line.quantity))
            .map(|(line, product)| ShortLine {
                product_id: product.id,
                name: product.name.clone(),
                available: product.stock,
                requested: line.quantity,
            })
            .collect();
        if !short.is_empty() {
            return Err(insufficient_stock_error(&short));
        }

        // Reservation pass: atomic conditional decrement per line. A line
        // that loses a concurrent race rolls back every earlier decrement.
        let mut reserved: Vec<(Uuid, u32)> = Vec::with_capacity(resolved.len());
        for (line, product) in &resolved {
            match self
                .products
                .reserve_stock(&line.product_id, line.quantity)
                .await
            {
                Ok(StockReservation::Reserved) => {
                    reserved.push((line.product_id, line.quantity));
                }
                Ok(StockReservation::Insufficient) => {
                    self.release_reserved(&reserved).await;
                    let available = self
                        .products
                        .find_by_id(&line.product_id)
                        .await
                        .ok()
                        .flatten()
                        .map_or(0, |current| current.stock);
                    return Err(insufficient_stock_error(&[ShortLine {
                        product_id: product.id,
                        name: product.name.clone(),
                        available,
                        requested: line.quantity,
                    }]));
                }
                Err(reserve_error) => {
                    self.release_reserved(&reserved).await;
                    return Err(map_product_error(reserve_error));
                }
            }
        }

        // Snapshot the catalogue into line items and fix the total.
        let items: Vec<LineItem> = resolved
            .iter()
            .map(|(line, product)| LineItem {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: line.quantity,
                image: product.image.clone(),
            })
            .collect();
        let total_amount = match total_of(&items) {
            Ok(total) => total,
            Err(overflow) => {
                self.release_reserved(&reserved).await;
                return Err(Error::invalid_request(format!(
                    "order total is not representable: {overflow}"
                )));
            }
        };

        let now = self.clock.utc();
        let order = Order {
            id: Uuid::new_v4(),
            account_id: account.id,
            items,
            shipping_info,
            total_amount,
            status: OrderStatus::Pending,
            archived: false,
            created_at: now,
            updated_at: now,
        };

        // The mandatory compensating action: an insert failure after the
        // decrements must restore every touched product.
        if let Err(insert_error) = self.orders.insert(&order).await {
            self.release_reserved(&reserved).await;
            return Err(map_order_error(insert_error));
        }

        self.open_order_thread(&account, &order).await;

        Ok(order)
    }

    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> Result<Order, Error> {
        let mut order = self.load_order(id).await?;
        if order.status == status {
            // Idempotent on repeat: nothing persisted, no reply appended.
            return Ok(order);
        }
        order.status = status;
        order.updated_at = self.clock.utc();
        self.persist_update(&order).await?;
        self.append_status_reply(&order, status).await;
        Ok(order)
    }

    async fn toggle_archive(&self, id: &Uuid) -> Result<Order, Error> {
        let mut order = self.load_order(id).await?;
        order.archived = !order.archived;
        order.updated_at = self.clock.utc();
        self.persist_update(&order).await?;
        Ok(order)
    }

    async fn update_shipping(
        &self,
        id: &Uuid,
        update: ShippingInfoUpdate,
    ) -> Result<Order, Error> {
        let mut order = self.load_order(id).await?;
        let merged = order.shipping_info.clone().merged(update);
        order.shipping_info = merged
            .validated()
            .map_err(|invalid| Error::invalid_request(invalid.to_string()))?;
        order.updated_at = self.clock.utc();
        self.persist_update(&order).await?;
        Ok(order)
    }

    async fn delete_order(&self, id: &Uuid) -> Result<(), Error> {
        // No stock restoration on delete.
        let deleted = self.orders.delete(id).await.map_err(map_order_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found(format!("order {id} not found")))
        }
    }
}

/// Order reads for customers and the admin console.
#[derive(Clone)]
pub struct OrderQueryService<O> {
    orders: Arc<O>,
}

impl<O> OrderQueryService<O> {
    /// Create the service over order persistence.
    pub fn new(orders: Arc<O>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl<O> OrderQuery for OrderQueryService<O>
where
    O: OrderRepository,
{
    async fn page(
        &self,
        filter: &OrderPageFilter,
        page: &PageRequest,
    ) -> Result<PageEnvelope<Order>, Error> {
        let (orders, total) = self
            .orders
            .page(filter, page)
            .await
            .map_err(map_order_error)?;
        Ok(PageEnvelope::new(orders, page, total))
    }

    async fn orders_for_account(&self, account: &Account) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_account(&account.id)
            .await
            .map_err(map_order_error)
    }

    async fn get_order(&self, id: &Uuid, requester: &Account) -> Result<Order, Error> {
        let order = self
            .orders
            .find_by_id(id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))?;
        if !requester.role.is_admin() && order.account_id != requester.id {
            return Err(Error::forbidden("order belongs to a different account"));
        }
        Ok(order)
    }

    async fn export_archived(&self) -> Result<Vec<Order>, Error> {
        self.orders.list_archived().await.map_err(map_order_error)
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
