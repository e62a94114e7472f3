//! Shared fixtures for HTTP integration tests.
//!
//! Builds the real `/api/v1` service tree over in-memory adapters, so the
//! tests exercise routing, session handling and the domain workflows
//! without PostgreSQL.

// Each integration binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use chrono::Utc;
use mockable::DefaultClock;
use uuid::Uuid;

use backend::domain::auth::{Account, AccountId, Email, Role};
use backend::domain::catalog::{Category, Product};
use backend::domain::money::Amount;
use backend::domain::{
    CatalogCommandService, CatalogQueryService, MessagingCommandService, MessagingQueryService,
    OrderCommandService, OrderQueryService,
};
use backend::inbound::http::state::HttpState;
use backend::middleware::Trace;
use backend::server::{api_services, session_middleware};
use backend::test_support::{
    InMemoryMessageRepository, InMemoryOrderRepository, InMemoryProductRepository,
    RecordingFileStore, StaticAccounts,
};

/// Password shared by every fixture account.
pub const PASSWORD: &str = "correct-horse-battery";

/// The stores and identities behind one test application.
pub struct TestBackend {
    /// Catalogue store, for stock assertions.
    pub products: Arc<InMemoryProductRepository>,
    /// Order store, for persistence assertions.
    pub orders: Arc<InMemoryOrderRepository>,
    /// Message store, for thread assertions.
    pub messages: Arc<InMemoryMessageRepository>,
    /// A customer account (yuki@example.com).
    pub customer: Account,
    /// A second customer account (hana@example.com).
    pub other_customer: Account,
    /// The admin account (admin@example.com).
    pub admin: Account,
    /// Ready-to-serve handler state.
    pub state: HttpState,
}

fn account(name: &str, email: &str, role: Role) -> Account {
    Account {
        id: AccountId::random(),
        name: name.to_owned(),
        email: Email::new(email).expect("valid fixture email"),
        role,
    }
}

/// A catalogue product with the given stock and price.
pub fn product(name: &str, stock: i32, cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: "integration fixture".to_owned(),
        price: Amount::from_cents(cents).expect("non-negative"),
        image: format!("/uploads/products/{}.jpg", name.to_lowercase()),
        category: Category::SnacksAndSweets,
        stock,
        featured: false,
        created_at: now,
        updated_at: now,
    }
}

/// Build a backend over the given catalogue.
pub fn backend_with_products(catalogue: Vec<Product>) -> TestBackend {
    let products = Arc::new(InMemoryProductRepository::with_products(catalogue));
    let orders = Arc::new(InMemoryOrderRepository::default());
    let messages = Arc::new(InMemoryMessageRepository::default());
    let files = Arc::new(RecordingFileStore::default());
    let clock = Arc::new(DefaultClock);

    let customer = account("Yuki Tanaka", "yuki@example.com", Role::Customer);
    let other_customer = account("Hana Sato", "hana@example.com", Role::Customer);
    let admin = account("Sakura Admin", "admin@example.com", Role::Admin);
    let directory = Arc::new(StaticAccounts::new(vec![
        (customer.clone(), PASSWORD.to_owned()),
        (other_customer.clone(), PASSWORD.to_owned()),
        (admin.clone(), PASSWORD.to_owned()),
    ]));

    let state = HttpState {
        login: Arc::clone(&directory) as Arc<dyn backend::domain::ports::LoginService>,
        accounts: directory,
        catalog: Arc::new(CatalogQueryService::new(Arc::clone(&products))),
        catalog_admin: Arc::new(CatalogCommandService::new(
            Arc::clone(&products),
            files,
            Arc::clone(&clock) as Arc<dyn mockable::Clock>,
        )),
        orders: Arc::new(OrderCommandService::new(
            Arc::clone(&products),
            Arc::clone(&orders),
            Arc::clone(&messages),
            Arc::clone(&clock) as Arc<dyn mockable::Clock>,
        )),
        orders_query: Arc::new(OrderQueryService::new(Arc::clone(&orders))),
        messaging: Arc::new(MessagingCommandService::new(
            Arc::clone(&messages),
            clock,
        )),
        messaging_query: Arc::new(MessagingQueryService::new(Arc::clone(&messages))),
    };

    TestBackend {
        products,
        orders,
        messages,
        customer,
        other_customer,
        admin,
        state,
    }
}

/// Initialise the actix service tree for a backend.
pub async fn spawn_app(
    backend: &TestBackend,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(backend.state.clone()))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session_middleware(Key::generate(), false))
                    .configure(api_services),
            ),
    )
    .await
}

/// Log in and return the session cookie.
pub async fn login(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "email": email, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert!(
        response.status().is_success(),
        "login failed for {email}: {}",
        response.status()
    );
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie issued")
        .into_owned()
}
