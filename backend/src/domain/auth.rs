//! Account identity primitives.
//!
//! The credential transport (cookie session) lives in the inbound adapter;
//! this module owns the validated identity types handlers and services pass
//! around: account ids, normalised emails, roles and login credentials.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

/// Failures raised when parsing an [`AccountId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("account id must be a valid UUID, got {0:?}")]
pub struct AccountIdError(pub String);

impl AccountId {
    /// Parse an id from its canonical string form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountIdError> {
        let raw = raw.as_ref();
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| AccountIdError(raw.to_owned()))
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// A freshly generated random id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A normalised (trimmed, lowercased) email address.
///
/// Emails correlate message threads to accounts, so normalisation happens
/// once at the boundary rather than ad hoc at each comparison site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

/// Failures raised when validating an [`Email`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    /// The value was empty after trimming.
    #[error("email must not be empty")]
    Empty,
    /// The value is missing the `@` separator.
    #[error("email must contain '@', got {0:?}")]
    MissingSeparator(String),
}

impl Email {
    /// Validate and normalise a raw email string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EmailError> {
        let normalised = raw.as_ref().trim().to_ascii_lowercase();
        if normalised.is_empty() {
            return Err(EmailError::Empty);
        }
        if !normalised.contains('@') {
            return Err(EmailError::MissingSeparator(normalised));
        }
        Ok(Self(normalised))
    }

    /// The normalised address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role determining which endpoints an identity may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Storefront customer.
    Customer,
    /// Console administrator.
    Admin,
}

impl Role {
    /// True for administrator accounts.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// An authenticated account identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable account identifier.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Normalised email; scopes "my orders" and "my messages".
    pub email: Email,
    /// Role for authorisation decisions.
    pub role: Role,
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    /// Normalised account email.
    pub email: Email,
    /// Raw password, verified against the stored digest by the adapter.
    pub password: String,
}

/// Failures raised when validating [`LoginCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// The email failed validation.
    #[error(transparent)]
    Email(#[from] EmailError),
    /// The password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl LoginCredentials {
    /// Validate raw login fields.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: password.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Identity validation coverage.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn account_id_round_trips() {
        let id = AccountId::random();
        let parsed = AccountId::new(id.to_string()).expect("canonical form parses");
        assert_eq!(parsed, id);
    }

    #[rstest]
    fn account_id_rejects_garbage() {
        assert!(AccountId::new("not-a-uuid").is_err());
    }

    #[rstest]
    #[case("  Yuki@Example.COM  ", "yuki@example.com")]
    #[case("a@b", "a@b")]
    fn email_normalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Email::new(raw).expect("valid").as_str(), expected);
    }

    #[rstest]
    #[case("", EmailError::Empty)]
    #[case("   ", EmailError::Empty)]
    #[case("no-at-sign", EmailError::MissingSeparator("no-at-sign".to_owned()))]
    fn email_rejects_invalid(#[case] raw: &str, #[case] expected: EmailError) {
        assert_eq!(Email::new(raw), Err(expected));
    }

    #[rstest]
    fn credentials_require_a_password() {
        let error = LoginCredentials::try_from_parts("a@b.example", "").expect_err("rejected");
        assert_eq!(error, LoginValidationError::EmptyPassword);
    }

    #[rstest]
    fn roles_gate_admin_checks() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Customer.is_admin());
    }
}
