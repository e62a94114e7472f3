//! Shared error mapping from driven-port failures to domain errors.
//!
//! Repository errors are infrastructure failures; nothing a client sent can
//! fix them, so they all surface as internal errors except the duplicate
//! order-thread case, which is a real conflict.

use crate::domain::Error;
use crate::domain::ports::{
    MessageRepositoryError, OrderRepositoryError, ProductRepositoryError,
};

pub(crate) fn map_product_error(error: ProductRepositoryError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_message_error(error: MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::DuplicateOrderThread { .. } => Error::conflict(error.to_string()),
        other => Error::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    //! Mapping coverage for the special-cased variants.

    use rstest::rstest;

    use crate::domain::ErrorCode;

    use super::*;

    #[rstest]
    fn duplicate_order_thread_is_a_conflict() {
        let error = map_message_error(MessageRepositoryError::duplicate_order_thread("abc"));
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    fn query_failures_are_internal() {
        let error = map_message_error(MessageRepositoryError::query("boom"));
        assert_eq!(error.code(), ErrorCode::InternalError);
        let error = map_product_error(ProductRepositoryError::connection("down"));
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
