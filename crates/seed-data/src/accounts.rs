//! Deterministic demo account generation.
//!
//! The same numeric seed always produces identical accounts, so repeated
//! seeding of a demo environment is reproducible and safe to diff.

use fake::Fake;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenerationError;

/// Largest supported number of generated customer accounts.
const MAX_CUSTOMERS: usize = 1_000;

/// Maximum attempts to derive a unique email before giving up.
const MAX_EMAIL_ATTEMPTS: usize = 100;

/// Domain used for generated demo emails.
const DEMO_EMAIL_DOMAIN: &str = "example.com";

/// Role assigned to a demo account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSeed {
    /// Storefront customer.
    Customer,
    /// Console administrator.
    Admin,
}

/// A demo account ready for insertion into an empty accounts table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSeed {
    /// Stable identifier, derived from the RNG stream.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique, lowercased email address.
    pub email: String,
    /// Plaintext demo password; the backend digests it at insertion.
    pub password: String,
    /// Account role.
    pub role: RoleSeed,
}

/// Generates the demo admin plus `customer_count` customer accounts.
///
/// The admin account is fixed; customers are derived from a ChaCha stream
/// seeded with `seed`, so the output is identical for identical inputs.
///
/// # Errors
///
/// Returns [`GenerationError::TooManyAccounts`] when `customer_count`
/// exceeds the supported maximum, and [`GenerationError::EmailCollision`]
/// if a unique email cannot be derived (practically unreachable below the
/// maximum count).
///
/// # Example
///
/// ```
/// use seed_data::{RoleSeed, generate_demo_accounts};
///
/// let accounts = generate_demo_accounts(7, 2).expect("generates");
/// assert_eq!(accounts.len(), 3);
/// assert_eq!(accounts[0].role, RoleSeed::Admin);
/// ```
pub fn generate_demo_accounts(
    seed: u64,
    customer_count: usize,
) -> Result<Vec<AccountSeed>, GenerationError> {
    if customer_count > MAX_CUSTOMERS {
        return Err(GenerationError::TooManyAccounts {
            requested: customer_count,
            max: MAX_CUSTOMERS,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut accounts = Vec::with_capacity(customer_count + 1);
    accounts.push(admin_account(&mut rng));

    for _ in 0..customer_count {
        let account = generate_customer(&mut rng, &accounts)?;
        accounts.push(account);
    }

    Ok(accounts)
}

fn admin_account(rng: &mut ChaCha8Rng) -> AccountSeed {
    AccountSeed {
        id: Uuid::from_u128(rng.random()),
        name: "Sakura Admin".to_owned(),
        email: format!("admin@{DEMO_EMAIL_DOMAIN}"),
        password: generate_password(rng),
        role: RoleSeed::Admin,
    }
}

fn generate_customer(
    rng: &mut ChaCha8Rng,
    existing: &[AccountSeed],
) -> Result<AccountSeed, GenerationError> {
    for _ in 0..MAX_EMAIL_ATTEMPTS {
        let first: String = FirstName(EN).fake_with_rng(rng);
        let last: String = LastName(EN).fake_with_rng(rng);
        let email = derive_email(&first, &last);
        if existing.iter().any(|account| account.email == email) {
            continue;
        }
        return Ok(AccountSeed {
            id: Uuid::from_u128(rng.random()),
            name: format!("{first} {last}"),
            email,
            password: generate_password(rng),
            role: RoleSeed::Customer,
        });
    }
    Err(GenerationError::EmailCollision {
        attempts: MAX_EMAIL_ATTEMPTS,
    })
}

/// Lowercase `first.last@example.com`, keeping only ASCII alphanumerics so
/// generated names with apostrophes or accents still yield plain emails.
fn derive_email(first: &str, last: &str) -> String {
    let sanitize = |part: &str| -> String {
        part.chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase()
    };
    format!(
        "{}.{}@{DEMO_EMAIL_DOMAIN}",
        sanitize(first),
        sanitize(last)
    )
}

/// 16 lowercase alphanumeric characters drawn from the seeded stream.
fn generate_password(rng: &mut ChaCha8Rng) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    (0..16)
        .map(|_| {
            let index = rng.random_range(0..ALPHABET.len());
            char::from(ALPHABET[index])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Determinism and uniqueness coverage for account generation.

    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn same_seed_is_deterministic() {
        let a = generate_demo_accounts(42, 25).expect("generates");
        let b = generate_demo_accounts(42, 25).expect("generates");
        assert_eq!(a, b);
    }

    #[rstest]
    fn different_seeds_diverge() {
        let a = generate_demo_accounts(1, 5).expect("generates");
        let b = generate_demo_accounts(2, 5).expect("generates");
        assert_ne!(a, b);
    }

    #[rstest]
    fn first_account_is_the_admin() {
        let accounts = generate_demo_accounts(3, 2).expect("generates");
        assert_eq!(accounts[0].role, RoleSeed::Admin);
        assert!(
            accounts[1..]
                .iter()
                .all(|account| account.role == RoleSeed::Customer)
        );
    }

    #[rstest]
    fn emails_are_unique_and_lowercase(#[values(0, 9, 1234)] seed: u64) {
        let accounts = generate_demo_accounts(seed, 50).expect("generates");
        let emails: HashSet<&str> = accounts.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails.len(), accounts.len());
        assert!(
            accounts
                .iter()
                .all(|a| a.email == a.email.to_ascii_lowercase())
        );
    }

    #[rstest]
    fn rejects_oversized_counts() {
        let error = generate_demo_accounts(0, 1_001).expect_err("must reject");
        assert!(matches!(error, GenerationError::TooManyAccounts { .. }));
    }

    #[rstest]
    fn derive_email_strips_punctuation() {
        assert_eq!(derive_email("O'Brien", "D Angelo"), "obrien.dangelo@example.com");
    }
}
