//! Messaging services: thread creation, replies, flags and scoping.
//!
//! Two audiences share the store. Admins see everything and may annotate
//! (read flag, request status, archive); customers only ever touch threads
//! whose email matches their account. Reply history is append-only; the
//! repository port offers no way to edit or remove an existing reply.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::auth::Account;
use crate::domain::message::{
    AuthorRole, Message, MessageDraft, Reply, RequestStatus,
};
use crate::domain::ports::{
    MessageListFilter, MessageRepository, MessagingCommand, MessagingQuery,
};
use crate::domain::service_support::map_message_error;

fn not_found(id: &Uuid) -> Error {
    Error::not_found(format!("message {id} not found"))
}

/// Messaging mutations for both audiences.
#[derive(Clone)]
pub struct MessagingCommandService<M> {
    messages: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<M> MessagingCommandService<M> {
    /// Create the service over message persistence.
    pub fn new(messages: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self { messages, clock }
    }
}

impl<M> MessagingCommandService<M>
where
    M: MessageRepository,
{
    async fn load(&self, id: &Uuid) -> Result<Message, Error> {
        self.messages
            .find_by_id(id)
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Customers may only act on threads carrying their own email.
    fn require_owner(thread: &Message, account: &Account) -> Result<(), Error> {
        if thread.email == account.email {
            Ok(())
        } else {
            Err(Error::forbidden("message belongs to a different account"))
        }
    }
}

#[async_trait]
impl<M> MessagingCommand for MessagingCommandService<M>
where
    M: MessageRepository,
{
    async fn submit(&self, draft: MessageDraft) -> Result<Message, Error> {
        let message = Message::from_draft(draft, Uuid::new_v4(), self.clock.utc());
        self.messages
            .insert(&message)
            .await
            .map_err(map_message_error)?;
        Ok(message)
    }

    async fn toggle_read(&self, id: &Uuid) -> Result<Message, Error> {
        let current = self.load(id).await?;
        self.messages
            .set_read(id, !current.read, self.clock.utc())
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn set_status(&self, id: &Uuid, status: RequestStatus) -> Result<Message, Error> {
        self.messages
            .set_status(id, status, self.clock.utc())
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn toggle_archive(&self, id: &Uuid) -> Result<Message, Error> {
        let current = self.load(id).await?;
        self.messages
            .set_archived(id, !current.archived, self.clock.utc())
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn admin_reply(
        &self,
        id: &Uuid,
        text: &str,
        admin_name: &str,
    ) -> Result<Message, Error> {
        let now = self.clock.utc();
        let reply = Reply::new(text, AuthorRole::Admin, admin_name, now)
            .map_err(|invalid| Error::invalid_request(invalid.to_string()))?;
        // Replying marks the thread read.
        self.messages
            .append_reply(id, &reply, true, now)
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn user_reply(
        &self,
        id: &Uuid,
        text: &str,
        account: &Account,
    ) -> Result<Message, Error> {
        let thread = self.load(id).await?;
        Self::require_owner(&thread, account)?;
        let now = self.clock.utc();
        let reply = Reply::new(text, AuthorRole::User, account.name.clone(), now)
            .map_err(|invalid| Error::invalid_request(invalid.to_string()))?;
        self.messages
            .append_reply(id, &reply, false, now)
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        let deleted = self.messages.delete(id).await.map_err(map_message_error)?;
        if deleted { Ok(()) } else { Err(not_found(id)) }
    }

    async fn delete_own(&self, id: &Uuid, account: &Account) -> Result<(), Error> {
        let thread = self.load(id).await?;
        Self::require_owner(&thread, account)?;
        let deleted = self.messages.delete(id).await.map_err(map_message_error)?;
        if deleted { Ok(()) } else { Err(not_found(id)) }
    }
}

/// Messaging reads for both audiences.
#[derive(Clone)]
pub struct MessagingQueryService<M> {
    messages: Arc<M>,
}

impl<M> MessagingQueryService<M> {
    /// Create the service over message persistence.
    pub fn new(messages: Arc<M>) -> Self {
        Self { messages }
    }
}

#[async_trait]
impl<M> MessagingQuery for MessagingQueryService<M>
where
    M: MessageRepository,
{
    async fn admin_list(&self, filter: &MessageListFilter) -> Result<Vec<Message>, Error> {
        self.messages.list(filter).await.map_err(map_message_error)
    }

    async fn unread_count(&self) -> Result<u64, Error> {
        self.messages.unread_count().await.map_err(map_message_error)
    }

    async fn mine(&self, account: &Account) -> Result<Vec<Message>, Error> {
        self.messages
            .list_for_email(&account.email)
            .await
            .map_err(map_message_error)
    }
}

#[cfg(test)]
#[path = "messaging_service_tests.rs"]
mod tests;
