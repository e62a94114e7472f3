//! PostgreSQL-backed `MessageRepository` implementation using Diesel.
//!
//! The one-thread-per-order invariant is a partial unique index on
//! `order_id`; a violation surfaces as the port's dedicated error variant.
//! Reply history is a JSONB array; appends load, extend and rewrite it,
//! which the port's append-only surface keeps safe from history edits.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::auth::Email;
use crate::domain::message::{Message, MessageKind, Reply, RequestStatus};
use crate::domain::ports::{
    MessageListFilter, MessageRepository, MessageRepositoryError, MonthWindow,
};

use super::error_mapping::{is_unique_violation, map_basic_diesel_error, map_basic_pool_error};
use super::models::{MessageRow, NewMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::messages;

/// Diesel-backed implementation of the message repository port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MessageRepositoryError {
    map_basic_pool_error(error, MessageRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MessageRepositoryError {
    map_basic_diesel_error(
        error,
        MessageRepositoryError::query,
        MessageRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain message.
fn row_to_message(row: MessageRow) -> Result<Message, MessageRepositoryError> {
    let MessageRow {
        id,
        kind,
        name,
        email,
        subject,
        body,
        item_name,
        category,
        description,
        budget,
        reference_url,
        attachments,
        replies,
        status,
        read,
        archived,
        order_id,
        created_at,
        updated_at,
    } = row;

    let kind = MessageKind::from_str(&kind)
        .map_err(|invalid| MessageRepositoryError::query(format!("kind for {id}: {invalid}")))?;
    let email = Email::new(&email)
        .map_err(|invalid| MessageRepositoryError::query(format!("email for {id}: {invalid}")))?;
    let attachments: Vec<String> = serde_json::from_value(attachments).map_err(|err| {
        MessageRepositoryError::query(format!("decode attachments for {id}: {err}"))
    })?;
    let replies: Vec<Reply> = serde_json::from_value(replies)
        .map_err(|err| MessageRepositoryError::query(format!("decode replies for {id}: {err}")))?;
    let status = RequestStatus::from_str(&status)
        .map_err(|invalid| MessageRepositoryError::query(format!("status for {id}: {invalid}")))?;

    Ok(Message {
        id,
        kind,
        name,
        email,
        subject,
        body,
        item_name,
        category,
        description,
        budget,
        reference_url,
        attachments,
        replies,
        status,
        read,
        archived,
        order_id,
        created_at,
        updated_at,
    })
}

/// UTC bounds of a calendar month: first instant inclusive, next month's
/// first instant exclusive.
fn month_bounds(
    window: MonthWindow,
) -> Result<(DateTime<Utc>, DateTime<Utc>), MessageRepositoryError> {
    let start = Utc
        .with_ymd_and_hms(window.year, window.month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            MessageRepositoryError::query(format!(
                "invalid month window {}-{}",
                window.year, window.month
            ))
        })?;
    let (next_year, next_month) = if window.month == 12 {
        (window.year + 1, 1)
    } else {
        (window.year, window.month + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            MessageRepositoryError::query(format!(
                "invalid month window {}-{}",
                window.year, window.month
            ))
        })?;
    Ok((start, end))
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let attachments = serde_json::to_value(&message.attachments).map_err(|err| {
            MessageRepositoryError::query(format!("serialise attachments: {err}"))
        })?;
        let replies = serde_json::to_value(&message.replies)
            .map_err(|err| MessageRepositoryError::query(format!("serialise replies: {err}")))?;
        let row = NewMessageRow {
            id: message.id,
            kind: message.kind.as_str(),
            name: &message.name,
            email: message.email.as_str(),
            subject: message.subject.as_deref(),
            body: message.body.as_deref(),
            item_name: message.item_name.as_deref(),
            category: message.category.as_deref(),
            description: message.description.as_deref(),
            budget: message.budget.as_deref(),
            reference_url: message.reference_url.as_deref(),
            attachments: &attachments,
            replies: &replies,
            status: message.status.as_str(),
            read: message.read,
            archived: message.archived,
            order_id: message.order_id,
            created_at: message.created_at,
            updated_at: message.updated_at,
        };
        diesel::insert_into(messages::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|insert_error| {
                if is_unique_violation(&insert_error)
                    && let Some(order_id) = message.order_id
                {
                    MessageRepositoryError::duplicate_order_thread(order_id.to_string())
                } else {
                    map_diesel_error(insert_error)
                }
            })
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = messages::table
            .filter(messages::id.eq(id))
            .select(MessageRow::as_select())
            .first::<MessageRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_message).transpose()
    }

    async fn find_by_order_id(
        &self,
        order_id: &Uuid,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = messages::table
            .filter(messages::order_id.eq(order_id))
            .select(MessageRow::as_select())
            .first::<MessageRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_message).transpose()
    }

    async fn list(
        &self,
        filter: &MessageListFilter,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = messages::table
            .select(MessageRow::as_select())
            .order((messages::created_at.desc(), messages::id.desc()))
            .into_boxed()
            .filter(messages::archived.eq(filter.archived));
        if let Some(kind) = filter.kind {
            query = query.filter(messages::kind.eq(kind.as_str()));
        }
        if let Some(window) = filter.created_in {
            let (start, end) = month_bounds(window)?;
            query = query
                .filter(messages::created_at.ge(start))
                .filter(messages::created_at.lt(end));
        }
        let rows: Vec<MessageRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }

    async fn list_for_email(
        &self,
        email: &Email,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::email.eq(email.as_str()))
            .order((messages::created_at.desc(), messages::id.desc()))
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }

    async fn append_reply(
        &self,
        id: &Uuid,
        reply: &Reply,
        mark_read: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        let Some(mut message) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        message.replies.push(reply.clone());
        if mark_read {
            message.read = true;
        }
        message.updated_at = at;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let replies = serde_json::to_value(&message.replies)
            .map_err(|err| MessageRepositoryError::query(format!("serialise replies: {err}")))?;
        let updated = diesel::update(messages::table.filter(messages::id.eq(id)))
            .set((
                messages::replies.eq(&replies),
                messages::read.eq(message.read),
                messages::updated_at.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok((updated == 1).then_some(message))
    }

    async fn set_read(
        &self,
        id: &Uuid,
        read: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(messages::table.filter(messages::id.eq(id)))
            .set((messages::read.eq(read), messages::updated_at.eq(at)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        drop(conn);
        if updated == 1 {
            self.find_by_id(id).await
        } else {
            Ok(None)
        }
    }

    async fn set_archived(
        &self,
        id: &Uuid,
        archived: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(messages::table.filter(messages::id.eq(id)))
            .set((messages::archived.eq(archived), messages::updated_at.eq(at)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        drop(conn);
        if updated == 1 {
            self.find_by_id(id).await
        } else {
            Ok(None)
        }
    }

    async fn set_status(
        &self,
        id: &Uuid,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(messages::table.filter(messages::id.eq(id)))
            .set((
                messages::status.eq(status.as_str()),
                messages::updated_at.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        drop(conn);
        if updated == 1 {
            self.find_by_id(id).await
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(messages::table.filter(messages::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted == 1)
    }

    async fn unread_count(&self) -> Result<u64, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = messages::table
            .filter(messages::read.eq(false))
            .filter(messages::archived.eq(false))
            .select(diesel::dsl::count_star())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
