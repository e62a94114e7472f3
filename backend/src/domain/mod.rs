//! Domain layer: entities, services and the ports they speak through.
//!
//! Everything here is transport and storage agnostic. Inbound adapters call
//! the driving ports (`CatalogQuery`, `OrderCommand`, ...); the services in
//! this module implement them over driven ports (repositories, the file
//! store) that outbound adapters provide.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod message;
pub mod money;
pub mod order;
pub mod ports;

mod catalog_service;
mod messaging_service;
mod order_service;
mod service_support;

pub use self::auth::{Account, AccountId, Email, LoginCredentials, LoginValidationError, Role};
pub use self::catalog_service::{CatalogCommandService, CatalogQueryService};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::messaging_service::{MessagingCommandService, MessagingQueryService};
pub use self::money::{Amount, AmountError};
pub use self::order_service::{OrderCommandService, OrderQueryService};
