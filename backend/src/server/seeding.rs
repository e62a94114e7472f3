//! Startup demo seeding, active behind the `seed-data` feature.
//!
//! Seeds only an empty database: if any account or product exists the run
//! is skipped.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

use crate::outbound::persistence::schema::{accounts, products};
use crate::outbound::persistence::{DbPool, password_digest};
use crate::outbound::persistence::pool::PoolError;

use super::config::SeedSettings;

/// Errors raised while seeding demo data.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Could not reach the database.
    #[error("seeding connection failed: {0}")]
    Connection(String),
    /// A seed query failed.
    #[error("seeding query failed: {0}")]
    Query(String),
    /// Demo data generation failed.
    #[error(transparent)]
    Generation(#[from] seed_data::GenerationError),
}

impl From<PoolError> for SeedError {
    fn from(error: PoolError) -> Self {
        Self::Connection(error.to_string())
    }
}

impl From<diesel::result::Error> for SeedError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Query(error.to_string())
    }
}

/// Populate an empty database with the demo catalogue and accounts.
pub async fn seed_if_enabled(settings: &SeedSettings, pool: &DbPool) -> Result<(), SeedError> {
    if !settings.enabled {
        return Ok(());
    }

    let mut conn = pool.get().await?;

    let account_count: i64 = accounts::table.count().get_result(&mut conn).await?;
    let product_count: i64 = products::table.count().get_result(&mut conn).await?;
    if account_count > 0 || product_count > 0 {
        info!(account_count, product_count, "database not empty; skipping demo seed");
        return Ok(());
    }

    let demo_accounts =
        seed_data::generate_demo_accounts(settings.seed(), settings.customer_count())?;
    for account in &demo_accounts {
        let digest = password_digest(&account.password);
        let role = match account.role {
            seed_data::RoleSeed::Customer => "customer",
            seed_data::RoleSeed::Admin => "admin",
        };
        diesel::insert_into(accounts::table)
            .values((
                accounts::id.eq(account.id),
                accounts::name.eq(&account.name),
                accounts::email.eq(&account.email),
                accounts::password_digest.eq(&digest),
                accounts::role.eq(role),
            ))
            .execute(&mut conn)
            .await?;
    }

    let catalogue = seed_data::demo_catalogue();
    for product in &catalogue {
        diesel::insert_into(products::table)
            .values((
                products::id.eq(Uuid::new_v4()),
                products::name.eq(&product.name),
                products::description.eq(&product.description),
                products::price_cents.eq(product.price_cents),
                products::image.eq(&product.image),
                products::category.eq(&product.category),
                products::stock.eq(product.stock),
                products::featured.eq(product.featured),
            ))
            .execute(&mut conn)
            .await?;
    }

    info!(
        accounts = demo_accounts.len(),
        products = catalogue.len(),
        "seeded demo data"
    );
    Ok(())
}
