//! Driving ports for the messaging workflow.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::auth::Account;
use crate::domain::message::{Message, MessageDraft, RequestStatus};

use super::message_repository::MessageListFilter;

/// Mutations of the message store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingCommand: Send + Sync {
    /// Create a thread from a validated draft (public submission or the
    /// placement workflow's order thread).
    async fn submit(&self, draft: MessageDraft) -> Result<Message, Error>;

    /// Flip the admin read flag.
    async fn toggle_read(&self, id: &Uuid) -> Result<Message, Error>;

    /// Set the request lifecycle status.
    async fn set_status(&self, id: &Uuid, status: RequestStatus) -> Result<Message, Error>;

    /// Flip the archived flag.
    async fn toggle_archive(&self, id: &Uuid) -> Result<Message, Error>;

    /// Append an admin reply; marks the thread read as a side effect.
    async fn admin_reply(
        &self,
        id: &Uuid,
        text: &str,
        admin_name: &str,
    ) -> Result<Message, Error>;

    /// Append a customer reply to the caller's own thread. Forbidden when
    /// the thread's email does not match the caller's account email.
    async fn user_reply(&self, id: &Uuid, text: &str, account: &Account)
    -> Result<Message, Error>;

    /// Hard-delete any thread (admin).
    async fn delete(&self, id: &Uuid) -> Result<(), Error>;

    /// Hard-delete the caller's own thread; Forbidden otherwise.
    async fn delete_own(&self, id: &Uuid, account: &Account) -> Result<(), Error>;
}

/// Read side of the message store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingQuery: Send + Sync {
    /// All threads matching the admin filter, newest first.
    async fn admin_list(&self, filter: &MessageListFilter) -> Result<Vec<Message>, Error>;

    /// Derived count of unread, non-archived threads for the admin badge.
    async fn unread_count(&self) -> Result<u64, Error>;

    /// The caller's own threads, newest first.
    async fn mine(&self, account: &Account) -> Result<Vec<Message>, Error>;
}

/// Fixture messaging command rejecting every mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessagingCommand;

#[async_trait]
impl MessagingCommand for FixtureMessagingCommand {
    async fn submit(&self, _draft: MessageDraft) -> Result<Message, Error> {
        Err(Error::internal("fixture message store cannot create threads"))
    }

    async fn toggle_read(&self, id: &Uuid) -> Result<Message, Error> {
        Err(Error::not_found(format!("message {id} not found")))
    }

    async fn set_status(&self, id: &Uuid, _status: RequestStatus) -> Result<Message, Error> {
        Err(Error::not_found(format!("message {id} not found")))
    }

    async fn toggle_archive(&self, id: &Uuid) -> Result<Message, Error> {
        Err(Error::not_found(format!("message {id} not found")))
    }

    async fn admin_reply(
        &self,
        id: &Uuid,
        _text: &str,
        _admin_name: &str,
    ) -> Result<Message, Error> {
        Err(Error::not_found(format!("message {id} not found")))
    }

    async fn user_reply(
        &self,
        id: &Uuid,
        _text: &str,
        _account: &Account,
    ) -> Result<Message, Error> {
        Err(Error::not_found(format!("message {id} not found")))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        Err(Error::not_found(format!("message {id} not found")))
    }

    async fn delete_own(&self, id: &Uuid, _account: &Account) -> Result<(), Error> {
        Err(Error::not_found(format!("message {id} not found")))
    }
}

/// Fixture messaging query recognising no threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessagingQuery;

#[async_trait]
impl MessagingQuery for FixtureMessagingQuery {
    async fn admin_list(&self, _filter: &MessageListFilter) -> Result<Vec<Message>, Error> {
        Ok(Vec::new())
    }

    async fn unread_count(&self) -> Result<u64, Error> {
        Ok(0)
    }

    async fn mine(&self, _account: &Account) -> Result<Vec<Message>, Error> {
        Ok(Vec::new())
    }
}
