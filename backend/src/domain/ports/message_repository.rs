//! Driven port for message-thread persistence.
//!
//! Reply append is a repository operation rather than a whole-row update so
//! the append-only history invariant is enforced at the port boundary:
//! nothing in the domain can rewrite or drop existing replies.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::auth::Email;
use crate::domain::message::{Message, MessageKind, Reply, RequestStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message persistence.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "message store connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "message store query failed: {message}",
        /// An order thread already exists for the given order.
        DuplicateOrderThread { order_id: String } =>
            "an order thread already exists for order {order_id}",
    }
}

/// Calendar month window for created-at filtering, interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    /// Calendar year.
    pub year: i32,
    /// Month 1 to 12.
    pub month: u32,
}

/// Filters applied to the admin message listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageListFilter {
    /// Restrict to one thread kind.
    pub kind: Option<MessageKind>,
    /// Whether to list archived (true) or live (false) threads.
    pub archived: bool,
    /// Restrict to threads created within one calendar month.
    pub created_in: Option<MonthWindow>,
}

/// Port for message persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new thread. Fails with
    /// [`MessageRepositoryError::DuplicateOrderThread`] when the draft
    /// references an order that already has a thread.
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError>;

    /// Fetch one thread.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Message>, MessageRepositoryError>;

    /// Fetch the thread correlated to an order, if any.
    async fn find_by_order_id(
        &self,
        order_id: &Uuid,
    ) -> Result<Option<Message>, MessageRepositoryError>;

    /// All threads matching `filter`, newest first.
    async fn list(
        &self,
        filter: &MessageListFilter,
    ) -> Result<Vec<Message>, MessageRepositoryError>;

    /// All threads whose sender email matches, newest first.
    async fn list_for_email(&self, email: &Email)
    -> Result<Vec<Message>, MessageRepositoryError>;

    /// Append a reply to a thread's history, optionally marking the thread
    /// read in the same operation. Returns the updated thread, or `None`
    /// when the id is unknown.
    async fn append_reply(
        &self,
        id: &Uuid,
        reply: &Reply,
        mark_read: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError>;

    /// Set the read flag. Returns the updated thread, or `None` when the id
    /// is unknown.
    async fn set_read(
        &self,
        id: &Uuid,
        read: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError>;

    /// Set the archived flag. Returns the updated thread, or `None` when
    /// the id is unknown.
    async fn set_archived(
        &self,
        id: &Uuid,
        archived: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError>;

    /// Set the request status. Returns the updated thread, or `None` when
    /// the id is unknown.
    async fn set_status(
        &self,
        id: &Uuid,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError>;

    /// Delete a thread. Returns false when the id is unknown.
    async fn delete(&self, id: &Uuid) -> Result<bool, MessageRepositoryError>;

    /// Number of unread, non-archived threads.
    async fn unread_count(&self) -> Result<u64, MessageRepositoryError>;
}

/// Fixture implementation for tests that do not exercise messaging.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageRepository;

#[async_trait]
impl MessageRepository for FixtureMessageRepository {
    async fn insert(&self, _message: &Message) -> Result<(), MessageRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &Uuid) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn find_by_order_id(
        &self,
        _order_id: &Uuid,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn list(
        &self,
        _filter: &MessageListFilter,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_email(
        &self,
        _email: &Email,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        Ok(Vec::new())
    }

    async fn append_reply(
        &self,
        _id: &Uuid,
        _reply: &Reply,
        _mark_read: bool,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn set_read(
        &self,
        _id: &Uuid,
        _read: bool,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn set_archived(
        &self,
        _id: &Uuid,
        _archived: bool,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn set_status(
        &self,
        _id: &Uuid,
        _status: RequestStatus,
        _at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: &Uuid) -> Result<bool, MessageRepositoryError> {
        Ok(false)
    }

    async fn unread_count(&self) -> Result<u64, MessageRepositoryError> {
        Ok(0)
    }
}
