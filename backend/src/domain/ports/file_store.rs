//! Driven port for stored file references.
//!
//! Upload transport is a collaborator concern; the domain only needs to
//! release stored files when the entity referencing them goes away
//! (deleting a product removes its image; replacing one removes the old
//! file). References are stable paths such as `/uploads/products/tea.jpg`.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by the file store.
    pub enum FileStoreError {
        /// The reference does not name a stored file.
        UnknownReference { reference: String } =>
            "no stored file for reference {reference}",
        /// The underlying storage failed.
        Io { message: String } =>
            "file store operation failed: {message}",
    }
}

/// Port for releasing stored files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Remove the file behind `reference`.
    async fn remove(&self, reference: &str) -> Result<(), FileStoreError>;
}

/// Fixture implementation for tests that do not exercise file storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFileStore;

#[async_trait]
impl FileStore for FixtureFileStore {
    async fn remove(&self, _reference: &str) -> Result<(), FileStoreError> {
        Ok(())
    }
}
