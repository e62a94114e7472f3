//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::Error;
use crate::domain::auth::Account;
use crate::domain::ports::{
    AccountsQuery, CatalogCommand, CatalogQuery, FixtureAccountsQuery, FixtureCatalogCommand,
    FixtureCatalogQuery, FixtureLoginService, FixtureMessagingCommand, FixtureMessagingQuery,
    FixtureOrderCommand, FixtureOrderQuery, LoginService, MessagingCommand, MessagingQuery,
    OrderCommand, OrderQuery,
};
use crate::inbound::http::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential verification for `POST /auth/login`.
    pub login: Arc<dyn LoginService>,
    /// Session-id-to-identity resolution.
    pub accounts: Arc<dyn AccountsQuery>,
    /// Catalogue reads.
    pub catalog: Arc<dyn CatalogQuery>,
    /// Catalogue admin mutations.
    pub catalog_admin: Arc<dyn CatalogCommand>,
    /// Order placement and admin mutations.
    pub orders: Arc<dyn OrderCommand>,
    /// Order reads.
    pub orders_query: Arc<dyn OrderQuery>,
    /// Messaging mutations.
    pub messaging: Arc<dyn MessagingCommand>,
    /// Messaging reads.
    pub messaging_query: Arc<dyn MessagingQuery>,
}

impl Default for HttpState {
    /// A state wired entirely to fixture ports; tests replace the pieces
    /// they exercise.
    fn default() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            accounts: Arc::new(FixtureAccountsQuery),
            catalog: Arc::new(FixtureCatalogQuery),
            catalog_admin: Arc::new(FixtureCatalogCommand),
            orders: Arc::new(FixtureOrderCommand),
            orders_query: Arc::new(FixtureOrderQuery),
            messaging: Arc::new(FixtureMessagingCommand),
            messaging_query: Arc::new(FixtureMessagingQuery),
        }
    }
}

impl HttpState {
    /// Resolve the session into a full account identity, or fail with
    /// `401 Unauthorized`.
    pub async fn require_user(&self, session: &SessionContext) -> Result<Account, Error> {
        let id = session.require_account_id()?;
        self.accounts
            .find_by_id(&id)
            .await
            .map_err(|lookup_error| Error::internal(lookup_error.to_string()))?
            .ok_or_else(|| Error::unauthorized("session account no longer exists"))
    }

    /// Resolve the session and require the admin role, failing with
    /// `403 Forbidden` for customers.
    pub async fn require_admin(&self, session: &SessionContext) -> Result<Account, Error> {
        let account = self.require_user(session).await?;
        if account.role.is_admin() {
            Ok(account)
        } else {
            Err(Error::forbidden("admin access required"))
        }
    }
}
