//! In-memory adapters for unit and integration tests.
//!
//! These doubles implement the driven ports over plain mutex-guarded maps so
//! workflow tests can observe real state transitions (stock levels, reply
//! histories) without a database. They mirror the adapter contracts: stock
//! reservation is conditional-and-atomic under the lock, and the message
//! store enforces the one-thread-per-order uniqueness rule.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::auth::{Account, AccountId, Email, LoginCredentials};
use crate::domain::catalog::Product;
use crate::domain::message::{Message, Reply, RequestStatus};
use crate::domain::order::Order;
use crate::domain::ports::{
    AccountsQuery, AccountsRepositoryError, FileStore, FileStoreError, LoginService,
    MessageListFilter, MessageRepository, MessageRepositoryError, OrderPageFilter,
    OrderRepository, OrderRepositoryError, ProductPageFilter, ProductRepository,
    ProductRepositoryError, ProductSort, StockReservation,
};

fn sorted_newest_first<T>(mut entries: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    entries.sort_by_key(|entry| std::cmp::Reverse(created_at(entry)));
    entries
}

/// Mutex-guarded catalogue store.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: Mutex<HashMap<Uuid, Product>>,
}

impl InMemoryProductRepository {
    /// Build a store pre-populated with `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let map = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: Mutex::new(map),
        }
    }

    /// Read back one product, for assertions.
    #[must_use]
    pub fn product(&self, id: &Uuid) -> Option<Product> {
        self.products.lock().expect("product store poisoned").get(id).cloned()
    }

    /// Current stock level of one product, for assertions.
    #[must_use]
    pub fn stock_of(&self, id: &Uuid) -> Option<i32> {
        self.product(id).map(|p| p.stock)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(self.product(id))
    }

    async fn page(
        &self,
        filter: &ProductPageFilter,
        request: &PageRequest,
    ) -> Result<(Vec<Product>, u64), ProductRepositoryError> {
        let guard = self.products.lock().expect("product store poisoned");
        let mut matches: Vec<Product> = guard
            .values()
            .filter(|p| filter.category.is_none_or(|c| p.category == c))
            .filter(|p| {
                filter.search.as_deref().is_none_or(|needle| {
                    p.name.to_lowercase().contains(&needle.to_lowercase())
                })
            })
            .filter(|p| !filter.featured_only || p.featured)
            .cloned()
            .collect();
        drop(guard);
        match filter.sort {
            ProductSort::Newest => {
                matches.sort_by_key(|p| std::cmp::Reverse(p.created_at));
            }
            ProductSort::PriceAsc => matches.sort_by_key(|p| p.price),
            ProductSort::PriceDesc => matches.sort_by_key(|p| std::cmp::Reverse(p.price)),
            ProductSort::Name => matches.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        let total = matches.len() as u64;
        let page: Vec<Product> = matches
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit()).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        self.products
            .lock()
            .expect("product store poisoned")
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, ProductRepositoryError> {
        let mut guard = self.products.lock().expect("product store poisoned");
        if let Some(existing) = guard.get_mut(&product.id) {
            *existing = product.clone();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, ProductRepositoryError> {
        Ok(self
            .products
            .lock()
            .expect("product store poisoned")
            .remove(id)
            .is_some())
    }

    async fn reserve_stock(
        &self,
        id: &Uuid,
        quantity: u32,
    ) -> Result<StockReservation, ProductRepositoryError> {
        let mut guard = self.products.lock().expect("product store poisoned");
        let Some(product) = guard.get_mut(id) else {
            return Ok(StockReservation::Insufficient);
        };
        let quantity = i64::from(quantity);
        if i64::from(product.stock) < quantity {
            return Ok(StockReservation::Insufficient);
        }
        product.stock = i32::try_from(i64::from(product.stock) - quantity)
            .map_err(|_| ProductRepositoryError::query("stock out of range"))?;
        Ok(StockReservation::Reserved)
    }

    async fn release_stock(
        &self,
        id: &Uuid,
        quantity: u32,
    ) -> Result<(), ProductRepositoryError> {
        let mut guard = self.products.lock().expect("product store poisoned");
        if let Some(product) = guard.get_mut(id) {
            product.stock = i32::try_from(i64::from(product.stock) + i64::from(quantity))
                .map_err(|_| ProductRepositoryError::query("stock out of range"))?;
        }
        Ok(())
    }
}

/// Mutex-guarded order store with an injectable insert failure.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, Order>>,
    fail_next_insert: AtomicBool,
}

impl InMemoryOrderRepository {
    /// Build a store pre-populated with `orders`.
    #[must_use]
    pub fn with_orders(orders: Vec<Order>) -> Self {
        let map = orders.into_iter().map(|o| (o.id, o)).collect();
        Self {
            orders: Mutex::new(map),
            fail_next_insert: AtomicBool::new(false),
        }
    }

    /// Make the next insert fail, simulating a downstream outage between
    /// stock reservation and order persistence.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Read back one order, for assertions.
    #[must_use]
    pub fn order(&self, id: &Uuid) -> Option<Order> {
        self.orders.lock().expect("order store poisoned").get(id).cloned()
    }

    /// Number of stored orders, for assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.lock().expect("order store poisoned").len()
    }

    /// True when no orders are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(OrderRepositoryError::query("injected insert failure"));
        }
        self.orders
            .lock()
            .expect("order store poisoned")
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self.order(id))
    }

    async fn page(
        &self,
        filter: &OrderPageFilter,
        request: &PageRequest,
    ) -> Result<(Vec<Order>, u64), OrderRepositoryError> {
        let guard = self.orders.lock().expect("order store poisoned");
        let matches: Vec<Order> = guard
            .values()
            .filter(|o| o.archived == filter.archived)
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        drop(guard);
        let matches = sorted_newest_first(matches, |o| o.created_at);
        let total = matches.len() as u64;
        let page: Vec<Order> = matches
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit()).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn list_for_account(
        &self,
        account: &AccountId,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        let guard = self.orders.lock().expect("order store poisoned");
        let matches: Vec<Order> = guard
            .values()
            .filter(|o| o.account_id == *account)
            .cloned()
            .collect();
        drop(guard);
        Ok(sorted_newest_first(matches, |o| o.created_at))
    }

    async fn list_archived(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        let guard = self.orders.lock().expect("order store poisoned");
        let matches: Vec<Order> = guard.values().filter(|o| o.archived).cloned().collect();
        drop(guard);
        Ok(sorted_newest_first(matches, |o| o.created_at))
    }

    async fn update(&self, order: &Order) -> Result<bool, OrderRepositoryError> {
        let mut guard = self.orders.lock().expect("order store poisoned");
        if let Some(existing) = guard.get_mut(&order.id) {
            *existing = order.clone();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, OrderRepositoryError> {
        Ok(self
            .orders
            .lock()
            .expect("order store poisoned")
            .remove(id)
            .is_some())
    }
}

/// Mutex-guarded message store enforcing one thread per order.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<HashMap<Uuid, Message>>,
}

impl InMemoryMessageRepository {
    /// Build a store pre-populated with `messages`.
    #[must_use]
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let map = messages.into_iter().map(|m| (m.id, m)).collect();
        Self {
            messages: Mutex::new(map),
        }
    }

    /// Read back one thread, for assertions.
    #[must_use]
    pub fn message(&self, id: &Uuid) -> Option<Message> {
        self.messages.lock().expect("message store poisoned").get(id).cloned()
    }

    /// The thread correlated to `order_id`, for assertions.
    #[must_use]
    pub fn thread_for_order(&self, order_id: &Uuid) -> Option<Message> {
        self.messages
            .lock()
            .expect("message store poisoned")
            .values()
            .find(|m| m.order_id == Some(*order_id))
            .cloned()
    }

    /// Number of stored threads, for assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().expect("message store poisoned").len()
    }

    /// True when no threads are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update_thread(
        &self,
        id: &Uuid,
        at: DateTime<Utc>,
        apply: impl FnOnce(&mut Message),
    ) -> Option<Message> {
        let mut guard = self.messages.lock().expect("message store poisoned");
        let message = guard.get_mut(id)?;
        apply(message);
        message.updated_at = at;
        Some(message.clone())
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        let mut guard = self.messages.lock().expect("message store poisoned");
        if let Some(order_id) = message.order_id
            && guard.values().any(|m| m.order_id == Some(order_id))
        {
            return Err(MessageRepositoryError::duplicate_order_thread(
                order_id.to_string(),
            ));
        }
        guard.insert(message.id, message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(self.message(id))
    }

    async fn find_by_order_id(
        &self,
        order_id: &Uuid,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(self.thread_for_order(order_id))
    }

    async fn list(
        &self,
        filter: &MessageListFilter,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let guard = self.messages.lock().expect("message store poisoned");
        let matches: Vec<Message> = guard
            .values()
            .filter(|m| m.archived == filter.archived)
            .filter(|m| filter.kind.is_none_or(|k| m.kind == k))
            .filter(|m| {
                filter.created_in.is_none_or(|window| {
                    m.created_at.year() == window.year && m.created_at.month() == window.month
                })
            })
            .cloned()
            .collect();
        drop(guard);
        Ok(sorted_newest_first(matches, |m| m.created_at))
    }

    async fn list_for_email(
        &self,
        email: &Email,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let guard = self.messages.lock().expect("message store poisoned");
        let matches: Vec<Message> = guard
            .values()
            .filter(|m| m.email == *email)
            .cloned()
            .collect();
        drop(guard);
        Ok(sorted_newest_first(matches, |m| m.created_at))
    }

    async fn append_reply(
        &self,
        id: &Uuid,
        reply: &Reply,
        mark_read: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(self.update_thread(id, at, |message| {
            message.replies.push(reply.clone());
            if mark_read {
                message.read = true;
            }
        }))
    }

    async fn set_read(
        &self,
        id: &Uuid,
        read: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(self.update_thread(id, at, |message| message.read = read))
    }

    async fn set_archived(
        &self,
        id: &Uuid,
        archived: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(self.update_thread(id, at, |message| message.archived = archived))
    }

    async fn set_status(
        &self,
        id: &Uuid,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(self.update_thread(id, at, |message| message.status = status))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, MessageRepositoryError> {
        Ok(self
            .messages
            .lock()
            .expect("message store poisoned")
            .remove(id)
            .is_some())
    }

    async fn unread_count(&self) -> Result<u64, MessageRepositoryError> {
        let guard = self.messages.lock().expect("message store poisoned");
        Ok(guard.values().filter(|m| !m.read && !m.archived).count() as u64)
    }
}

/// Fixed account directory doubling as login service and accounts query.
#[derive(Debug, Default)]
pub struct StaticAccounts {
    entries: Vec<(Account, String)>,
}

impl StaticAccounts {
    /// Build a directory from `(account, password)` pairs.
    #[must_use]
    pub fn new(entries: Vec<(Account, String)>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl LoginService for StaticAccounts {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        Ok(self
            .entries
            .iter()
            .find(|(account, password)| {
                account.email == credentials.email && *password == credentials.password
            })
            .map(|(account, _)| account.clone()))
    }
}

#[async_trait]
impl AccountsQuery for StaticAccounts {
    async fn find_by_id(
        &self,
        id: &AccountId,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        Ok(self
            .entries
            .iter()
            .find(|(account, _)| account.id == *id)
            .map(|(account, _)| account.clone()))
    }
}

/// File store that records removals instead of touching disk.
#[derive(Debug, Default)]
pub struct RecordingFileStore {
    removed: Mutex<Vec<String>>,
}

impl RecordingFileStore {
    /// References removed so far, in order.
    #[must_use]
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().expect("file store poisoned").clone()
    }
}

#[async_trait]
impl FileStore for RecordingFileStore {
    async fn remove(&self, reference: &str) -> Result<(), FileStoreError> {
        self.removed
            .lock()
            .expect("file store poisoned")
            .push(reference.to_owned());
        Ok(())
    }
}
