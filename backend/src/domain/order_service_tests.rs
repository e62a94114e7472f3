//! Behaviour coverage for the placement and status workflows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use pagination::PageRequest;
use rstest::rstest;
use uuid::Uuid;

use crate::domain::auth::{Account, AccountId, Email, Role};
use crate::domain::catalog::{Category, Product};
use crate::domain::message::{AuthorRole, Message, MessageKind, Reply, RequestStatus};
use crate::domain::money::Amount;
use crate::domain::order::{CartLine, Order, OrderStatus, ShippingInfo, ShippingInfoUpdate};
use crate::domain::ports::{
    MessageListFilter, MessageRepository, MessageRepositoryError, OrderCommand, OrderPageFilter,
    OrderQuery, PlaceOrderRequest, ProductRepository,
};
use crate::domain::{Error, ErrorCode, OrderCommandService, OrderQueryService};
use crate::test_support::{
    InMemoryMessageRepository, InMemoryOrderRepository, InMemoryProductRepository,
};

fn customer() -> Account {
    Account {
        id: AccountId::random(),
        name: "Yuki Tanaka".to_owned(),
        email: Email::new("yuki@example.com").expect("valid"),
        role: Role::Customer,
    }
}

fn admin() -> Account {
    Account {
        id: AccountId::random(),
        name: "Sakura Admin".to_owned(),
        email: Email::new("admin@example.com").expect("valid"),
        role: Role::Admin,
    }
}

fn product(name: &str, stock: i32, cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: "demo".to_owned(),
        price: Amount::from_cents(cents).expect("non-negative"),
        image: format!("/uploads/{name}.jpg"),
        category: Category::SnacksAndSweets,
        stock,
        featured: false,
        created_at: now,
        updated_at: now,
    }
}

fn shipping() -> ShippingInfo {
    ShippingInfo {
        full_name: "Yuki Tanaka".to_owned(),
        email: "yuki@example.com".to_owned(),
        address: "1-2-3 Sakura Dori".to_owned(),
        city: "Kyoto".to_owned(),
        postal_code: "600-8001".to_owned(),
        country: "Japan".to_owned(),
    }
}

struct Stores {
    products: Arc<InMemoryProductRepository>,
    orders: Arc<InMemoryOrderRepository>,
    messages: Arc<InMemoryMessageRepository>,
    command: OrderCommandService<
        InMemoryProductRepository,
        InMemoryOrderRepository,
        InMemoryMessageRepository,
    >,
}

fn stores(products: Vec<Product>) -> Stores {
    let products = Arc::new(InMemoryProductRepository::with_products(products));
    let orders = Arc::new(InMemoryOrderRepository::default());
    let messages = Arc::new(InMemoryMessageRepository::default());
    let command = OrderCommandService::new(
        Arc::clone(&products),
        Arc::clone(&orders),
        Arc::clone(&messages),
        Arc::new(DefaultClock),
    );
    Stores {
        products,
        orders,
        messages,
        command,
    }
}

fn request(account: Account, lines: Vec<CartLine>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        account,
        lines,
        shipping_info: shipping(),
    }
}

fn line(product: &Product, quantity: u32) -> CartLine {
    CartLine {
        product_id: product.id,
        quantity,
    }
}

#[rstest]
#[actix_rt::test]
async fn placement_reserves_stock_and_snapshots_prices() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);

    let order = fixture
        .command
        .place_order(request(customer(), vec![line(&tea, 2)]))
        .await
        .expect("order placed");

    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.archived);
    assert_eq!(order.total_amount.cents(), 2000);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].name, "Sencha");
    assert_eq!(order.items[0].price.cents(), 1000);
    assert_eq!(fixture.products.stock_of(&tea.id), Some(3));
    assert!(fixture.orders.order(&order.id).is_some());
}

#[rstest]
#[actix_rt::test]
async fn placement_opens_a_correlated_order_thread() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);

    let order = fixture
        .command
        .place_order(request(customer(), vec![line(&tea, 2)]))
        .await
        .expect("order placed");

    let thread = fixture
        .messages
        .thread_for_order(&order.id)
        .expect("thread created");
    assert_eq!(thread.kind, MessageKind::Order);
    assert_eq!(thread.subject.as_deref(), Some(order.thread_subject().as_str()));
    assert_eq!(thread.email.as_str(), "yuki@example.com");
    let body = thread.body.expect("summary body");
    assert!(body.contains("Sencha x2 - $20.00"));
    assert!(body.contains("Total: $20.00"));
    assert!(body.contains("Ship to: Yuki Tanaka"));
    assert!(thread.replies.is_empty());
}

#[rstest]
#[actix_rt::test]
async fn placement_rejects_unknown_products_without_effects() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let ghost = CartLine {
        product_id: Uuid::new_v4(),
        quantity: 1,
    };

    let error = fixture
        .command
        .place_order(request(customer(), vec![line(&tea, 1), ghost]))
        .await
        .expect_err("unknown product");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(fixture.products.stock_of(&tea.id), Some(5));
    assert!(fixture.orders.is_empty());
    assert!(fixture.messages.is_empty());
}

#[rstest]
#[actix_rt::test]
async fn placement_reports_every_short_line_and_touches_nothing() {
    let tea = product("Sencha", 5, 1000);
    let bowl = product("Ramen Bowl", 1, 3499);
    let kitkat = product("Matcha Kit Kat", 50, 1299);
    let fixture = stores(vec![tea.clone(), bowl.clone(), kitkat.clone()]);

    let error = fixture
        .command
        .place_order(request(
            customer(),
            vec![line(&tea, 10), line(&bowl, 3), line(&kitkat, 1)],
        ))
        .await
        .expect_err("two short lines");

    assert_eq!(error.code(), ErrorCode::InsufficientStock);
    assert!(error.message().contains("Sencha (5 available, 10 requested)"));
    assert!(error.message().contains("Ramen Bowl (1 available, 3 requested)"));
    let details = error.details().expect("itemised details");
    assert_eq!(details["items"].as_array().map(Vec::len), Some(2));

    // All-or-nothing: not even the satisfiable line was reserved.
    assert_eq!(fixture.products.stock_of(&tea.id), Some(5));
    assert_eq!(fixture.products.stock_of(&bowl.id), Some(1));
    assert_eq!(fixture.products.stock_of(&kitkat.id), Some(50));
    assert!(fixture.orders.is_empty());
}

#[rstest]
#[actix_rt::test]
async fn placement_rejects_empty_carts() {
    let fixture = stores(Vec::new());
    let error = fixture
        .command
        .place_order(request(customer(), Vec::new()))
        .await
        .expect_err("empty cart");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[actix_rt::test]
async fn placement_rejects_zero_quantities() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let error = fixture
        .command
        .place_order(request(customer(), vec![line(&tea, 0)]))
        .await
        .expect_err("zero quantity");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(fixture.products.stock_of(&tea.id), Some(5));
}

#[rstest]
#[actix_rt::test]
async fn duplicate_lines_each_reserve_stock() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);

    let order = fixture
        .command
        .place_order(request(customer(), vec![line(&tea, 1), line(&tea, 2)]))
        .await
        .expect("both lines placed");

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_amount.cents(), 3000);
    assert_eq!(fixture.products.stock_of(&tea.id), Some(2));
}

#[rstest]
#[actix_rt::test]
async fn insert_failure_rolls_back_every_reservation() {
    let tea = product("Sencha", 5, 1000);
    let bowl = product("Ramen Bowl", 4, 3499);
    let fixture = stores(vec![tea.clone(), bowl.clone()]);
    fixture.orders.fail_next_insert();

    let error = fixture
        .command
        .place_order(request(customer(), vec![line(&tea, 2), line(&bowl, 1)]))
        .await
        .expect_err("insert fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(fixture.products.stock_of(&tea.id), Some(5));
    assert_eq!(fixture.products.stock_of(&bowl.id), Some(4));
    assert!(fixture.orders.is_empty());
    assert!(fixture.messages.is_empty());
}

/// Message store whose insert always fails; everything else is empty.
#[derive(Debug, Default)]
struct BrokenMessageStore;

#[async_trait]
impl MessageRepository for BrokenMessageStore {
    async fn insert(&self, _message: &Message) -> Result<(), MessageRepositoryError> {
        Err(MessageRepositoryError::query("message store offline"))
    }

    async fn find_by_id(&self, _id: &Uuid) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn find_by_order_id(
        &self,
        _order_id: &Uuid,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &MessageListFilter,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_email(
        &self,
        _email: &Email,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(Vec::new())
    }

    async fn append_reply(
        &self,
        _id: &Uuid,
        _reply: &Reply,
        _mark_read: bool,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn set_read(
        &self,
        _id: &Uuid,
        _read: bool,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn set_archived(
        &self,
        _id: &Uuid,
        _archived: bool,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn set_status(
        &self,
        _id: &Uuid,
        _status: RequestStatus,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: &Uuid) -> Result<bool, MessageRepositoryError> {
        Ok(false)
    }

    async fn unread_count(&self) -> Result<u64, MessageRepositoryError> {
        Ok(0)
    }
}

#[rstest]
#[actix_rt::test]
async fn thread_creation_failure_does_not_fail_placement() {
    let tea = product("Sencha", 5, 1000);
    let products = Arc::new(InMemoryProductRepository::with_products(vec![tea.clone()]));
    let orders = Arc::new(InMemoryOrderRepository::default());
    let command = OrderCommandService::new(
        Arc::clone(&products),
        Arc::clone(&orders),
        Arc::new(BrokenMessageStore),
        Arc::new(DefaultClock),
    );

    let order = command
        .place_order(request(customer(), vec![line(&tea, 1)]))
        .await
        .expect("order placed despite broken messaging");

    assert!(orders.order(&order.id).is_some());
    assert_eq!(products.stock_of(&tea.id), Some(4));
}

async fn placed_order(fixture: &Stores, tea: &Product) -> Order {
    fixture
        .command
        .place_order(request(customer(), vec![line(tea, 1)]))
        .await
        .expect("order placed")
}

#[rstest]
#[actix_rt::test]
async fn status_change_appends_exactly_one_thread_reply() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let order = placed_order(&fixture, &tea).await;

    let updated = fixture
        .command
        .update_status(&order.id, OrderStatus::Shipped)
        .await
        .expect("status updated");
    assert_eq!(updated.status, OrderStatus::Shipped);

    let thread = fixture
        .messages
        .thread_for_order(&order.id)
        .expect("thread exists");
    assert_eq!(thread.replies.len(), 1);
    let reply = &thread.replies[0];
    assert_eq!(reply.author_role, AuthorRole::Admin);
    assert!(reply.text.contains(&format!("#{}", order.short_id())));
    assert!(reply.text.contains("shipped"));
}

#[rstest]
#[actix_rt::test]
async fn same_status_update_is_a_no_op() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let order = placed_order(&fixture, &tea).await;

    let unchanged = fixture
        .command
        .update_status(&order.id, OrderStatus::Pending)
        .await
        .expect("no-op succeeds");
    assert_eq!(unchanged.status, OrderStatus::Pending);

    let thread = fixture
        .messages
        .thread_for_order(&order.id)
        .expect("thread exists");
    assert!(thread.replies.is_empty());
}

#[rstest]
#[actix_rt::test]
async fn repeated_transitions_append_one_reply_each() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let order = placed_order(&fixture, &tea).await;

    for status in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Shipped] {
        fixture
            .command
            .update_status(&order.id, status)
            .await
            .expect("update succeeds");
    }

    let thread = fixture
        .messages
        .thread_for_order(&order.id)
        .expect("thread exists");
    // Two real transitions; the repeated `shipped` added nothing.
    assert_eq!(thread.replies.len(), 2);
}

#[rstest]
#[actix_rt::test]
async fn status_change_without_a_thread_is_silent() {
    let tea = product("Sencha", 5, 1000);
    let products = Arc::new(InMemoryProductRepository::with_products(vec![tea.clone()]));
    let orders = Arc::new(InMemoryOrderRepository::default());
    let command = OrderCommandService::new(
        Arc::clone(&products),
        Arc::clone(&orders),
        Arc::new(BrokenMessageStore),
        Arc::new(DefaultClock),
    );
    let order = command
        .place_order(request(customer(), vec![line(&tea, 1)]))
        .await
        .expect("order placed");

    let updated = command
        .update_status(&order.id, OrderStatus::Delivered)
        .await
        .expect("update succeeds without a thread");
    assert_eq!(updated.status, OrderStatus::Delivered);
}

#[rstest]
#[actix_rt::test]
async fn status_update_for_unknown_order_is_not_found() {
    let fixture = stores(Vec::new());
    let error = fixture
        .command
        .update_status(&Uuid::new_v4(), OrderStatus::Shipped)
        .await
        .expect_err("unknown order");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[actix_rt::test]
async fn archive_toggle_flips_the_flag() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let order = placed_order(&fixture, &tea).await;

    let archived = fixture
        .command
        .toggle_archive(&order.id)
        .await
        .expect("archived");
    assert!(archived.archived);
    let restored = fixture
        .command
        .toggle_archive(&order.id)
        .await
        .expect("unarchived");
    assert!(!restored.archived);
}

#[rstest]
#[actix_rt::test]
async fn shipping_edit_merges_partial_fields() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let order = placed_order(&fixture, &tea).await;

    let updated = fixture
        .command
        .update_shipping(
            &order.id,
            ShippingInfoUpdate {
                city: Some("Osaka".to_owned()),
                ..ShippingInfoUpdate::default()
            },
        )
        .await
        .expect("merged");
    assert_eq!(updated.shipping_info.city, "Osaka");
    assert_eq!(updated.shipping_info.country, "Japan");

    let error = fixture
        .command
        .update_shipping(
            &order.id,
            ShippingInfoUpdate {
                country: Some("  ".to_owned()),
                ..ShippingInfoUpdate::default()
            },
        )
        .await
        .expect_err("blank field rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[actix_rt::test]
async fn deleting_an_order_does_not_restore_stock() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let order = placed_order(&fixture, &tea).await;
    assert_eq!(fixture.products.stock_of(&tea.id), Some(4));

    fixture
        .command
        .delete_order(&order.id)
        .await
        .expect("deleted");

    assert!(fixture.orders.is_empty());
    // Deliberate: deletion is bookkeeping, not a return.
    assert_eq!(fixture.products.stock_of(&tea.id), Some(4));
}

#[rstest]
#[actix_rt::test]
async fn owners_and_admins_may_read_an_order_others_may_not() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let owner = customer();
    let order = fixture
        .command
        .place_order(request(owner.clone(), vec![line(&tea, 1)]))
        .await
        .expect("order placed");
    let query = OrderQueryService::new(Arc::clone(&fixture.orders));

    assert!(query.get_order(&order.id, &owner).await.is_ok());
    assert!(query.get_order(&order.id, &admin()).await.is_ok());

    let stranger = Account {
        id: AccountId::random(),
        name: "Mallory".to_owned(),
        email: Email::new("mallory@example.com").expect("valid"),
        role: Role::Customer,
    };
    let error = query
        .get_order(&order.id, &stranger)
        .await
        .expect_err("stranger rejected");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[actix_rt::test]
async fn default_listing_excludes_archived_orders() {
    let tea = product("Sencha", 50, 1000);
    let fixture = stores(vec![tea.clone()]);
    let live = placed_order(&fixture, &tea).await;
    let archived = placed_order(&fixture, &tea).await;
    fixture
        .command
        .toggle_archive(&archived.id)
        .await
        .expect("archived");
    let query = OrderQueryService::new(Arc::clone(&fixture.orders));
    let page = PageRequest::new(1, 20).expect("valid window");

    let default_page = query
        .page(&OrderPageFilter::default(), &page)
        .await
        .expect("lists");
    assert_eq!(default_page.total, 1);
    assert_eq!(default_page.items[0].id, live.id);

    let archived_page = query
        .page(
            &OrderPageFilter {
                archived: true,
                ..OrderPageFilter::default()
            },
            &page,
        )
        .await
        .expect("lists");
    assert_eq!(archived_page.total, 1);
    assert_eq!(archived_page.items[0].id, archived.id);

    let export = query.export_archived().await.expect("exports");
    assert_eq!(export.len(), 1);
    assert_eq!(export[0].id, archived.id);
}

#[rstest]
#[actix_rt::test]
async fn my_orders_are_scoped_to_the_account() {
    let tea = product("Sencha", 50, 1000);
    let fixture = stores(vec![tea.clone()]);
    let first = customer();
    let second = Account {
        id: AccountId::random(),
        name: "Hana Sato".to_owned(),
        email: Email::new("hana@example.com").expect("valid"),
        role: Role::Customer,
    };
    fixture
        .command
        .place_order(request(first.clone(), vec![line(&tea, 1)]))
        .await
        .expect("first order");
    fixture
        .command
        .place_order(request(second.clone(), vec![line(&tea, 1)]))
        .await
        .expect("second order");
    let query = OrderQueryService::new(Arc::clone(&fixture.orders));

    let mine = query.orders_for_account(&first).await.expect("lists");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].account_id, first.id);
}

#[rstest]
#[actix_rt::test]
async fn catalogue_edits_do_not_rewrite_order_history() {
    let tea = product("Sencha", 5, 1000);
    let fixture = stores(vec![tea.clone()]);
    let order = fixture
        .command
        .place_order(request(customer(), vec![line(&tea, 2)]))
        .await
        .expect("order placed");

    // Reprice and rename the product after the sale.
    let mut repriced = fixture.products.product(&tea.id).expect("exists");
    repriced.price = Amount::from_cents(9999).expect("non-negative");
    repriced.name = "Sencha Deluxe".to_owned();
    fixture
        .products
        .update(&repriced)
        .await
        .expect("updated");

    let stored = fixture.orders.order(&order.id).expect("stored");
    assert_eq!(stored.total_amount.cents(), 2000);
    assert_eq!(stored.items[0].name, "Sencha");
    assert_eq!(stored.items[0].price.cents(), 1000);
}

#[rstest]
fn insufficient_stock_errors_are_the_documented_shape() {
    let error: Error = super::insufficient_stock_error(&[super::ShortLine {
        product_id: Uuid::new_v4(),
        name: "Sencha".to_owned(),
        available: 5,
        requested: 10,
    }]);
    assert_eq!(error.code(), ErrorCode::InsufficientStock);
    assert_eq!(
        error.message(),
        "Insufficient stock: Sencha (5 available, 10 requested)"
    );
}
