//! File storage adapters implementing the `FileStore` port.

mod local_file_store;

pub use local_file_store::LocalFileStore;
