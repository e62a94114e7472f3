//! Shared mapping from Diesel and pool failures to port error variants.
//!
//! Every repository distinguishes only "could not reach the store" from
//! "the store rejected the operation"; this module centralises the match
//! so the adapters stay uniform.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::pool::PoolError;

/// Map a pool failure to the port's connection variant.
pub(crate) fn map_basic_pool_error<E>(error: PoolError, to_connection: impl Fn(String) -> E) -> E {
    to_connection(error.to_string())
}

/// Map a Diesel failure, routing lost connections to the connection
/// variant and everything else to the query variant.
pub(crate) fn map_basic_diesel_error<E>(
    error: DieselError,
    to_query: impl Fn(String) -> E,
    to_connection: impl Fn(String) -> E,
) -> E {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            to_connection(info.message().to_owned())
        }
        DieselError::NotFound => to_query("record not found".to_owned()),
        other => to_query(other.to_string()),
    }
}

/// True when the failure is a unique-constraint violation, used by the
/// message adapter to detect a second thread for one order.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
