//! PostgreSQL-backed login and account lookup adapters.
//!
//! Credentials are verified against a SHA-256 hex digest. Credential
//! issuance is a collaborator concern; a stronger KDF would touch only
//! this file and the seeding path.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sha2::{Digest, Sha256};

use crate::domain::auth::{Account, AccountId, Email, LoginCredentials, Role};
use crate::domain::ports::{
    AccountsQuery, AccountsRepositoryError, LoginService,
};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::AccountRow;
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

/// Hex-encoded SHA-256 digest of a password, as stored in `accounts`.
#[must_use]
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_pool_error(error: PoolError) -> AccountsRepositoryError {
    map_basic_pool_error(error, AccountsRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountsRepositoryError {
    map_basic_diesel_error(
        error,
        AccountsRepositoryError::query,
        AccountsRepositoryError::connection,
    )
}

fn parse_role(raw: &str, id: &uuid::Uuid) -> Result<Role, AccountsRepositoryError> {
    match raw {
        "customer" => Ok(Role::Customer),
        "admin" => Ok(Role::Admin),
        other => Err(AccountsRepositoryError::query(format!(
            "role for {id}: unknown value {other:?}"
        ))),
    }
}

/// Convert a database row into a validated domain account.
fn row_to_account(row: &AccountRow) -> Result<Account, AccountsRepositoryError> {
    let email = Email::new(&row.email).map_err(|invalid| {
        AccountsRepositoryError::query(format!("email for {}: {invalid}", row.id))
    })?;
    Ok(Account {
        id: AccountId::from_uuid(row.id),
        name: row.name.clone(),
        email,
        role: parse_role(&row.role, &row.id)?,
    })
}

/// Diesel-backed implementation of both account ports.
#[derive(Clone)]
pub struct DieselAccountAdapters {
    pool: DbPool,
}

impl DieselAccountAdapters {
    /// Create a new adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginService for DieselAccountAdapters {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::email.eq(credentials.email.as_str()))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        if row.password_digest != password_digest(&credentials.password) {
            return Ok(None);
        }
        row_to_account(&row).map(Some)
    }
}

#[async_trait]
impl AccountsQuery for DieselAccountAdapters {
    async fn find_by_id(
        &self,
        id: &AccountId,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = accounts::table
            .filter(accounts::id.eq(id.as_uuid()))
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.as_ref().map(row_to_account).transpose()
    }
}
