//! Capability-scoped local file store.
//!
//! References look like `/uploads/products/sencha.jpg`; the part after the
//! public prefix resolves inside a capability-scoped directory, so a
//! malicious reference can never reach outside the uploads root.

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::domain::ports::{FileStore, FileStoreError};

/// Public path prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// `FileStore` over a local directory, opened with capability scoping.
pub struct LocalFileStore {
    root: Dir,
}

impl LocalFileStore {
    /// Open the store over `path`, which must already exist.
    pub fn open(path: &std::path::Path) -> std::io::Result<Self> {
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { root })
    }

    /// Resolve a public reference to a path relative to the root.
    fn relative_path(reference: &str) -> Result<&str, FileStoreError> {
        let relative = reference
            .strip_prefix(PUBLIC_PREFIX)
            .ok_or_else(|| FileStoreError::unknown_reference(reference))?;
        if relative.is_empty() {
            return Err(FileStoreError::unknown_reference(reference));
        }
        Ok(relative)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn remove(&self, reference: &str) -> Result<(), FileStoreError> {
        let relative = Self::relative_path(reference)?;
        match self.root.remove_file(relative) {
            Ok(()) => Ok(()),
            Err(io_error) if io_error.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::unknown_reference(reference))
            }
            Err(io_error) => Err(FileStoreError::io(io_error.to_string())),
        }
    }
}
