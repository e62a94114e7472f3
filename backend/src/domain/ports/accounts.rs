//! Driven ports for account lookup and credential verification.
//!
//! Credential issuance is a collaborator concern; these ports are the
//! contract the backend consumes: verify a login and resolve a session's
//! account id back into a full identity.

use async_trait::async_trait;

use crate::domain::auth::{Account, AccountId, LoginCredentials};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account persistence.
    pub enum AccountsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account store connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "account store query failed: {message}",
    }
}

/// Port verifying login credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials, returning the account on success and `None` when
    /// the email is unknown or the password does not match. The two failure
    /// modes are deliberately indistinguishable.
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<Account>, AccountsRepositoryError>;
}

/// Port resolving account ids to identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsQuery: Send + Sync {
    /// Fetch the account behind a session id, if it still exists.
    async fn find_by_id(
        &self,
        id: &AccountId,
    ) -> Result<Option<Account>, AccountsRepositoryError>;
}

/// Fixture login service recognising no credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(
        &self,
        _credentials: &LoginCredentials,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        Ok(None)
    }
}

/// Fixture accounts query recognising no ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountsQuery;

#[async_trait]
impl AccountsQuery for FixtureAccountsQuery {
    async fn find_by_id(
        &self,
        _id: &AccountId,
    ) -> Result<Option<Account>, AccountsRepositoryError> {
        Ok(None)
    }
}
