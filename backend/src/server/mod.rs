//! Server assembly: settings, state wiring, route registration, bootstrap.

pub mod config;
#[cfg(feature = "seed-data")]
mod seeding;

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::{info, warn};

use crate::domain::{
    CatalogCommandService, CatalogQueryService, MessagingCommandService, MessagingQueryService,
    OrderCommandService, OrderQueryService,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, messages, orders, products};
use crate::middleware::{RateLimit, Trace};
use crate::outbound::persistence::{
    DbPool, DieselAccountAdapters, DieselMessageRepository, DieselOrderRepository,
    DieselProductRepository, PoolConfig, migrations,
};
use crate::outbound::storage::LocalFileStore;

use self::config::AppSettings;

/// Wire the Diesel adapters into domain services and bundle them for the
/// HTTP layer.
pub fn build_state(pool: &DbPool, file_store: LocalFileStore) -> HttpState {
    let products_repo = Arc::new(DieselProductRepository::new(pool.clone()));
    let orders_repo = Arc::new(DieselOrderRepository::new(pool.clone()));
    let messages_repo = Arc::new(DieselMessageRepository::new(pool.clone()));
    let accounts = Arc::new(DieselAccountAdapters::new(pool.clone()));
    let files = Arc::new(file_store);
    let clock = Arc::new(DefaultClock);

    HttpState {
        login: Arc::clone(&accounts) as Arc<dyn crate::domain::ports::LoginService>,
        accounts,
        catalog: Arc::new(CatalogQueryService::new(Arc::clone(&products_repo))),
        catalog_admin: Arc::new(CatalogCommandService::new(
            Arc::clone(&products_repo),
            files,
            Arc::clone(&clock) as Arc<dyn mockable::Clock>,
        )),
        orders: Arc::new(OrderCommandService::new(
            Arc::clone(&products_repo),
            Arc::clone(&orders_repo),
            Arc::clone(&messages_repo),
            Arc::clone(&clock) as Arc<dyn mockable::Clock>,
        )),
        orders_query: Arc::new(OrderQueryService::new(orders_repo)),
        messaging: Arc::new(MessagingCommandService::new(
            Arc::clone(&messages_repo),
            clock,
        )),
        messaging_query: Arc::new(MessagingQueryService::new(messages_repo)),
    }
}

/// Register every `/api/v1` handler.
///
/// Literal paths (`/orders/export`, `/orders/my-orders`, `/messages/mine`)
/// are registered before their `{id}` siblings so they are matched first.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(products::list_categories)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::create_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(orders::place_order)
        .service(orders::list_orders)
        .service(orders::my_orders)
        .service(orders::export_orders)
        .service(orders::update_order_status)
        .service(orders::toggle_order_archive)
        .service(orders::get_order)
        .service(orders::update_order_shipping)
        .service(orders::delete_order)
        .service(messages::list_messages)
        .service(messages::unread_count)
        .service(messages::my_messages)
        .service(messages::user_reply)
        .service(messages::delete_my_message)
        .service(messages::toggle_read)
        .service(messages::update_message_status)
        .service(messages::toggle_message_archive)
        .service(messages::admin_reply)
        .service(messages::delete_message)
        .service(
            // The public submission endpoint is the one unauthenticated
            // write; it gets its own rate-limited scope. An empty-prefix
            // scope claims every path that reaches it, so it must be the
            // last registration.
            web::scope("")
                .wrap(RateLimit::submissions())
                .service(messages::submit_message),
        );
}

/// Build the session middleware used by the API scope.
pub fn session_middleware(
    key: Key,
    cookie_secure: bool,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Load the session signing key, falling back to an ephemeral key only in
/// debug builds or when explicitly allowed.
fn session_key(settings: &AppSettings) -> std::io::Result<Key> {
    let Some(path) = &settings.session_key_file else {
        if cfg!(debug_assertions) || settings.session_allow_ephemeral {
            warn!("no session key file configured; using an ephemeral key");
            return Ok(Key::generate());
        }
        return Err(std::io::Error::other(
            "SAKURA_SESSION_KEY_FILE must be set in release builds",
        ));
    };
    match std::fs::read(path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(read_error) => {
            if cfg!(debug_assertions) || settings.session_allow_ephemeral {
                warn!(path = %path.display(), error = %read_error, "using ephemeral session key");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {read_error}",
                    path.display()
                )))
            }
        }
    }
}

/// Bootstrap: run migrations, build the pool and state, then serve.
pub async fn run(settings: AppSettings) -> std::io::Result<()> {
    let database_url = settings
        .database_url
        .clone()
        .ok_or_else(|| std::io::Error::other("SAKURA_DATABASE_URL must be set"))?;

    migrations::run_pending_migrations(&database_url)
        .await
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(std::io::Error::other)?;

    #[cfg(feature = "seed-data")]
    {
        use ortho_config::OrthoConfig;

        let seed_settings =
            config::SeedSettings::load().map_err(std::io::Error::other)?;
        seeding::seed_if_enabled(&seed_settings, &pool)
            .await
            .map_err(std::io::Error::other)?;
    }

    let uploads_dir = settings.uploads_dir();
    std::fs::create_dir_all(&uploads_dir)?;
    let file_store = LocalFileStore::open(&uploads_dir)?;

    let state = web::Data::new(build_state(&pool, file_store));
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let key = session_key(&settings)?;
    let cookie_secure = settings.cookie_secure;

    info!(bind_addr = settings.bind_addr(), "starting server");
    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session_middleware(key.clone(), cookie_secure))
                    .configure(api_services),
            )
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = {
            use utoipa::OpenApi;
            app.service(
                utoipa_swagger_ui::SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", crate::doc::ApiDoc::openapi()),
            )
        };

        app
    })
    .bind(settings.bind_addr())?;

    health_state.mark_ready();
    server.run().await
}
