//! Embedded schema migrations.
//!
//! Migrations run once at startup over a short-lived synchronous
//! connection (the migration harness is synchronous); the async pool is
//! only built afterwards.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// All migrations shipped with the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while migrating the schema.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open the migration connection.
    #[error("failed to connect for migrations: {0}")]
    Connection(String),
    /// A migration failed to apply.
    #[error("failed to run migrations: {0}")]
    Apply(String),
    /// The blocking migration task was cancelled.
    #[error("migration task failed: {0}")]
    Join(String),
}

/// Apply any pending migrations against `database_url`.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let database_url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|connect_error| MigrationError::Connection(connect_error.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|apply_error| MigrationError::Apply(apply_error.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|join_error| MigrationError::Join(join_error.to_string()))?
}
