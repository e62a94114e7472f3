//! Inbound adapters: everything that accepts requests from the outside.

pub mod http;
