//! Messaging entities: contact enquiries, item requests and order threads.
//!
//! A message is a conversation thread with an append-only reply list. Three
//! kinds share the shape: contact enquiries (subject + body), item requests
//! (what the customer wants sourced) and order threads (created by the
//! placement workflow, one per order). Read and archived flags are admin
//! bookkeeping; request status is a lifecycle field for request threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::auth::Email;

/// Maximum number of attachment references on one thread.
pub const MAX_ATTACHMENTS: usize = 5;

/// Author name used for workflow-generated admin replies.
pub const SHOP_AUTHOR_NAME: &str = "Sakura Carts";

/// The kind of conversation a message thread holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// General contact enquiry.
    Contact,
    /// Item sourcing request.
    Request,
    /// Per-order chat thread, created by order placement.
    Order,
}

impl MessageKind {
    /// The wire form of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Request => "request",
            Self::Order => "order",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised when parsing a [`MessageKind`] from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type {0:?}")]
pub struct MessageKindParseError(pub String);

impl std::str::FromStr for MessageKind {
    type Err = MessageKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contact" => Ok(Self::Contact),
            "request" => Ok(Self::Request),
            "order" => Ok(Self::Order),
            other => Err(MessageKindParseError(other.to_owned())),
        }
    }
}

/// Lifecycle of an item request thread.
///
/// `Replied` and `Closed` are legacy terminal values kept for older data;
/// they remain settable. No transition validation is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Newly submitted. Initial state.
    #[default]
    Pending,
    /// An admin is looking into sourcing.
    Reviewing,
    /// The item can be sourced.
    Available,
    /// The item cannot be sourced.
    Unavailable,
    /// Legacy: answered in an older workflow.
    Replied,
    /// Legacy: closed in an older workflow.
    Closed,
}

impl RequestStatus {
    /// The wire form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::Replied => "replied",
            Self::Closed => "closed",
        }
    }
}

/// Failures raised when parsing a [`RequestStatus`] from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status {0:?}")]
pub struct RequestStatusParseError(pub String);

impl std::str::FromStr for RequestStatus {
    type Err = RequestStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewing" => Ok(Self::Reviewing),
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            "replied" => Ok(Self::Replied),
            "closed" => Ok(Self::Closed),
            other => Err(RequestStatusParseError(other.to_owned())),
        }
    }
}

/// Who authored a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorRole {
    /// Console administrator (or the workflow acting as one).
    Admin,
    /// The thread's customer.
    User,
}

/// One entry in a thread's append-only reply list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Reply body.
    pub text: String,
    /// Whether an admin or the customer wrote it.
    pub author_role: AuthorRole,
    /// Display name of the author.
    pub author_name: String,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Failures raised when validating message fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageValidationError {
    /// Sender name blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Contact subject blank.
    #[error("subject must not be empty")]
    EmptySubject,
    /// Contact body blank.
    #[error("message must not be empty")]
    EmptyBody,
    /// Request item name blank.
    #[error("itemName must not be empty")]
    EmptyItemName,
    /// More than [`MAX_ATTACHMENTS`] attachment references.
    #[error("at most {MAX_ATTACHMENTS} attachments are allowed, got {0}")]
    TooManyAttachments(usize),
    /// Reply text blank.
    #[error("reply text must not be empty")]
    EmptyReplyText,
}

impl Reply {
    /// Validate and build a reply with a server-assigned timestamp.
    pub fn new(
        text: &str,
        author_role: AuthorRole,
        author_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, MessageValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MessageValidationError::EmptyReplyText);
        }
        Ok(Self {
            text: text.to_owned(),
            author_role,
            author_name: author_name.into(),
            created_at,
        })
    }
}

/// A message thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Stable identifier.
    pub id: Uuid,
    /// Thread kind.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Sender display name.
    pub name: String,
    /// Sender email; scopes "my messages".
    pub email: Email,
    /// Contact subject, or the constructed `Order #<short-id>` subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Contact body, or the generated order summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Requested item name (request threads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    /// Free-form category hint (request threads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Longer request description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Budget hint (request threads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    /// Reference URL (request threads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
    /// File-store references attached by the sender.
    pub attachments: Vec<String>,
    /// Append-only conversation history.
    pub replies: Vec<Reply>,
    /// Request lifecycle state (meaningful for request threads).
    pub status: RequestStatus,
    /// Admin read flag.
    pub read: bool,
    /// Hidden from default admin listings when true.
    pub archived: bool,
    /// Correlated order for order threads; unique per order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Assemble a persisted-shape thread from a validated draft.
    ///
    /// New threads start unread, unarchived, with an empty reply history
    /// and the default request status.
    #[must_use]
    pub fn from_draft(draft: MessageDraft, id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: draft.kind,
            name: draft.name,
            email: draft.email,
            subject: draft.subject,
            body: draft.body,
            item_name: draft.item_name,
            category: draft.category,
            description: draft.description,
            budget: draft.budget,
            reference_url: draft.reference_url,
            attachments: draft.attachments,
            replies: Vec::new(),
            status: RequestStatus::default(),
            read: false,
            archived: false,
            order_id: draft.order_id,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Validated payload for creating a message thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    /// Thread kind.
    pub kind: MessageKind,
    /// Sender display name.
    pub name: String,
    /// Sender email.
    pub email: Email,
    /// Subject (contact and order threads).
    pub subject: Option<String>,
    /// Body (contact and order threads).
    pub body: Option<String>,
    /// Requested item name.
    pub item_name: Option<String>,
    /// Free-form category hint.
    pub category: Option<String>,
    /// Longer request description.
    pub description: Option<String>,
    /// Budget hint.
    pub budget: Option<String>,
    /// Reference URL.
    pub reference_url: Option<String>,
    /// File-store references.
    pub attachments: Vec<String>,
    /// Correlated order (order threads only).
    pub order_id: Option<Uuid>,
}

fn require(value: &str, error: MessageValidationError) -> Result<String, MessageValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(error);
    }
    Ok(value.to_owned())
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn check_attachments(attachments: &[String]) -> Result<(), MessageValidationError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(MessageValidationError::TooManyAttachments(attachments.len()));
    }
    Ok(())
}

impl MessageDraft {
    /// Validate a contact enquiry.
    pub fn contact(
        name: &str,
        email: Email,
        subject: &str,
        body: &str,
        attachments: Vec<String>,
    ) -> Result<Self, MessageValidationError> {
        check_attachments(&attachments)?;
        Ok(Self {
            kind: MessageKind::Contact,
            name: require(name, MessageValidationError::EmptyName)?,
            email,
            subject: Some(require(subject, MessageValidationError::EmptySubject)?),
            body: Some(require(body, MessageValidationError::EmptyBody)?),
            item_name: None,
            category: None,
            description: None,
            budget: None,
            reference_url: None,
            attachments,
            order_id: None,
        })
    }

    /// Validate an item sourcing request.
    #[expect(clippy::too_many_arguments, reason = "request threads carry many optional hints")]
    pub fn request(
        name: &str,
        email: Email,
        item_name: &str,
        category: Option<&str>,
        description: Option<&str>,
        budget: Option<&str>,
        reference_url: Option<&str>,
        attachments: Vec<String>,
    ) -> Result<Self, MessageValidationError> {
        check_attachments(&attachments)?;
        Ok(Self {
            kind: MessageKind::Request,
            name: require(name, MessageValidationError::EmptyName)?,
            email,
            subject: None,
            body: None,
            item_name: Some(require(item_name, MessageValidationError::EmptyItemName)?),
            category: optional(category),
            description: optional(description),
            budget: optional(budget),
            reference_url: optional(reference_url),
            attachments,
            order_id: None,
        })
    }

    /// Build the order thread created alongside a new order.
    pub fn order_thread(
        name: &str,
        email: Email,
        order_id: Uuid,
        subject: String,
        body: String,
    ) -> Result<Self, MessageValidationError> {
        Ok(Self {
            kind: MessageKind::Order,
            name: require(name, MessageValidationError::EmptyName)?,
            email,
            subject: Some(subject),
            body: Some(body),
            item_name: None,
            category: None,
            description: None,
            budget: None,
            reference_url: None,
            attachments: Vec::new(),
            order_id: Some(order_id),
        })
    }
}
