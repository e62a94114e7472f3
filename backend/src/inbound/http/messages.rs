//! Messaging handlers.
//!
//! ```text
//! POST   /api/v1/messages                 (public, rate limited)
//! GET    /api/v1/messages                 (admin)
//! GET    /api/v1/messages/unread-count    (admin)
//! GET    /api/v1/messages/mine
//! PATCH  /api/v1/messages/{id}/read       (admin)
//! PATCH  /api/v1/messages/{id}/status     (admin)
//! PATCH  /api/v1/messages/{id}/archive    (admin)
//! POST   /api/v1/messages/{id}/reply      (admin)
//! POST   /api/v1/messages/mine/{id}/reply
//! DELETE /api/v1/messages/{id}            (admin)
//! DELETE /api/v1/messages/mine/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::auth::Email;
use crate::domain::message::{AuthorRole, Message, MessageDraft, MessageKind, Reply};
use crate::domain::ports::MessageListFilter;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_message_kind, parse_month_window, parse_request_status, parse_uuid,
    require_string,
};

/// Public submission body; fields vary by `type`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageBody {
    /// `contact` or `request` (`order` threads are workflow-created).
    #[serde(rename = "type")]
    pub kind: String,
    /// Sender display name.
    pub name: Option<String>,
    /// Sender email.
    pub email: Option<String>,
    /// Contact subject.
    pub subject: Option<String>,
    /// Contact body.
    pub message: Option<String>,
    /// Requested item name (request type).
    pub item_name: Option<String>,
    /// Free-form category hint (request type).
    pub category: Option<String>,
    /// Longer request description.
    pub description: Option<String>,
    /// Budget hint.
    pub budget: Option<String>,
    /// Reference URL.
    pub reference_url: Option<String>,
    /// Up to 5 file-store references.
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// One reply on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
    /// Reply text.
    pub text: String,
    /// `admin` or `user`.
    pub author_role: String,
    /// Author display name.
    pub author_name: String,
    /// Server-assigned creation timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Reply> for ReplyBody {
    fn from(reply: Reply) -> Self {
        Self {
            text: reply.text,
            author_role: match reply.author_role {
                AuthorRole::Admin => "admin".to_owned(),
                AuthorRole::User => "user".to_owned(),
            },
            author_name: reply.author_name,
            created_at: reply.created_at.to_rfc3339(),
        }
    }
}

/// One message thread on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Thread kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Sender display name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject (contact and order threads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Body (contact and order threads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Requested item name (request threads).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    /// Free-form category hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Longer request description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Budget hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    /// Reference URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
    /// Attachment references.
    pub attachments: Vec<String>,
    /// Append-only conversation history.
    pub replies: Vec<ReplyBody>,
    /// Request lifecycle state.
    pub status: String,
    /// Admin read flag.
    pub read: bool,
    /// Archived flag.
    pub archived: bool,
    /// Correlated order for order threads.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "uuid")]
    pub order_id: Option<String>,
    /// Submission timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Message> for MessageBody {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            kind: message.kind.as_str().to_owned(),
            name: message.name,
            email: message.email.to_string(),
            subject: message.subject,
            message: message.body,
            item_name: message.item_name,
            category: message.category,
            description: message.description,
            budget: message.budget,
            reference_url: message.reference_url,
            attachments: message.attachments,
            replies: message.replies.into_iter().map(ReplyBody::from).collect(),
            status: message.status.as_str().to_owned(),
            read: message.read,
            archived: message.archived,
            order_id: message.order_id.map(|id| id.to_string()),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Reply request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReplyRequestBody {
    /// Reply text.
    pub text: String,
}

/// Request status update body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateMessageStatusBody {
    /// Target status: pending, reviewing, available, unavailable, replied
    /// or closed.
    pub status: String,
}

/// Unread badge payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountBody {
    /// Number of unread, non-archived threads.
    pub unread: u64,
}

/// Query parameters accepted by the admin message listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    /// Restrict to one thread kind.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// List archived threads instead of live ones.
    pub archived: Option<bool>,
    /// Calendar month (1 to 12); requires `year`.
    pub month: Option<u32>,
    /// Calendar year; requires `month`.
    pub year: Option<i32>,
}

fn draft_from_submission(body: SubmitMessageBody) -> Result<MessageDraft, Error> {
    let kind = parse_message_kind(&body.kind, FieldName::new("type"))?;
    let name = require_string(body.name, FieldName::new("name"))?;
    let email = Email::new(require_string(body.email, FieldName::new("email"))?)
        .map_err(|invalid| {
            Error::invalid_request(invalid.to_string())
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        })?;

    let draft = match kind {
        MessageKind::Contact => MessageDraft::contact(
            &name,
            email,
            &require_string(body.subject, FieldName::new("subject"))?,
            &require_string(body.message, FieldName::new("message"))?,
            body.attachments,
        ),
        MessageKind::Request => MessageDraft::request(
            &name,
            email,
            &require_string(body.item_name, FieldName::new("itemName"))?,
            body.category.as_deref(),
            body.description.as_deref(),
            body.budget.as_deref(),
            body.reference_url.as_deref(),
            body.attachments,
        ),
        MessageKind::Order => {
            // Order threads are created only by the placement workflow.
            return Err(Error::invalid_request("type must be contact or request")
                .with_details(json!({ "field": "type", "code": "invalid_enum" })));
        }
    };
    draft.map_err(|invalid| Error::invalid_request(invalid.to_string()))
}

/// Submit a contact enquiry or item request (public, rate limited).
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    request_body = SubmitMessageBody,
    responses(
        (status = 201, description = "Thread created", body = MessageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 429, description = "Rate limited", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "submitMessage",
    security([])
)]
#[post("/messages")]
pub async fn submit_message(
    state: web::Data<HttpState>,
    payload: web::Json<SubmitMessageBody>,
) -> ApiResult<HttpResponse> {
    let draft = draft_from_submission(payload.into_inner())?;
    let message = state.messaging.submit(draft).await?;
    Ok(HttpResponse::Created().json(MessageBody::from(message)))
}

/// List threads for the admin console.
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    params(
        ("type" = Option<String>, Query, description = "contact, request or order"),
        ("archived" = Option<bool>, Query, description = "List archived threads (default false)"),
        ("month" = Option<u32>, Query, description = "Calendar month 1-12; requires year"),
        ("year" = Option<i32>, Query, description = "Calendar year; requires month")
    ),
    responses(
        (status = 200, description = "Matching threads, newest first", body = [MessageBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MessageListQuery>,
) -> ApiResult<web::Json<Vec<MessageBody>>> {
    state.require_admin(&session).await?;
    let query = query.into_inner();
    let filter = MessageListFilter {
        kind: query
            .kind
            .as_deref()
            .map(|raw| parse_message_kind(raw, FieldName::new("type")))
            .transpose()?,
        archived: query.archived.unwrap_or(false),
        created_in: parse_month_window(query.month, query.year)?,
    };
    let messages = state.messaging_query.admin_list(&filter).await?;
    Ok(web::Json(messages.into_iter().map(MessageBody::from).collect()))
}

/// The derived unread badge count (admin).
#[utoipa::path(
    get,
    path = "/api/v1/messages/unread-count",
    responses(
        (status = 200, description = "Unread thread count", body = UnreadCountBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "unreadCount"
)]
#[get("/messages/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UnreadCountBody>> {
    state.require_admin(&session).await?;
    let unread = state.messaging_query.unread_count().await?;
    Ok(web::Json(UnreadCountBody { unread }))
}

/// The caller's own threads, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/messages/mine",
    responses(
        (status = 200, description = "The caller's threads", body = [MessageBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listMyMessages"
)]
#[get("/messages/mine")]
pub async fn my_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<MessageBody>>> {
    let account = state.require_user(&session).await?;
    let messages = state.messaging_query.mine(&account).await?;
    Ok(web::Json(messages.into_iter().map(MessageBody::from).collect()))
}

/// Toggle a thread's read flag (admin).
#[utoipa::path(
    patch,
    path = "/api/v1/messages/{id}/read",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Thread updated", body = MessageBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown thread", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "toggleMessageRead"
)]
#[patch("/messages/{id}/read")]
pub async fn toggle_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let message = state.messaging.toggle_read(&id).await?;
    Ok(web::Json(MessageBody::from(message)))
}

/// Set a request thread's lifecycle status (admin).
#[utoipa::path(
    patch,
    path = "/api/v1/messages/{id}/status",
    params(("id" = String, Path, description = "Message id")),
    request_body = UpdateMessageStatusBody,
    responses(
        (status = 200, description = "Thread updated", body = MessageBody),
        (status = 400, description = "Invalid status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown thread", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "updateMessageStatus"
)]
#[patch("/messages/{id}/status")]
pub async fn update_message_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateMessageStatusBody>,
) -> ApiResult<web::Json<MessageBody>> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let status = parse_request_status(&payload.status, FieldName::new("status"))?;
    let message = state.messaging.set_status(&id, status).await?;
    Ok(web::Json(MessageBody::from(message)))
}

/// Toggle a thread's archived flag (admin).
#[utoipa::path(
    patch,
    path = "/api/v1/messages/{id}/archive",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Thread updated", body = MessageBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown thread", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "toggleMessageArchive"
)]
#[patch("/messages/{id}/archive")]
pub async fn toggle_message_archive(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageBody>> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let message = state.messaging.toggle_archive(&id).await?;
    Ok(web::Json(MessageBody::from(message)))
}

/// Append an admin reply; marks the thread read.
#[utoipa::path(
    post,
    path = "/api/v1/messages/{id}/reply",
    params(("id" = String, Path, description = "Message id")),
    request_body = ReplyRequestBody,
    responses(
        (status = 200, description = "Reply appended", body = MessageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown thread", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "adminReply"
)]
#[post("/messages/{id}/reply")]
pub async fn admin_reply(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReplyRequestBody>,
) -> ApiResult<web::Json<MessageBody>> {
    let admin = state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let message = state
        .messaging
        .admin_reply(&id, &payload.text, &admin.name)
        .await?;
    Ok(web::Json(MessageBody::from(message)))
}

/// Append a customer reply to the caller's own thread.
#[utoipa::path(
    post,
    path = "/api/v1/messages/mine/{id}/reply",
    params(("id" = String, Path, description = "Message id")),
    request_body = ReplyRequestBody,
    responses(
        (status = 200, description = "Reply appended", body = MessageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Thread belongs to someone else", body = ErrorSchema),
        (status = 404, description = "Unknown thread", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "userReply"
)]
#[post("/messages/mine/{id}/reply")]
pub async fn user_reply(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReplyRequestBody>,
) -> ApiResult<web::Json<MessageBody>> {
    let account = state.require_user(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let message = state
        .messaging
        .user_reply(&id, &payload.text, &account)
        .await?;
    Ok(web::Json(MessageBody::from(message)))
}

/// Hard-delete any thread (admin).
#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown thread", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "deleteMessage"
)]
#[delete("/messages/{id}")]
pub async fn delete_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.messaging.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Hard-delete the caller's own thread.
#[utoipa::path(
    delete,
    path = "/api/v1/messages/mine/{id}",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Thread belongs to someone else", body = ErrorSchema),
        (status = 404, description = "Unknown thread", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "deleteMyMessage"
)]
#[delete("/messages/mine/{id}")]
pub async fn delete_my_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let account = state.require_user(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.messaging.delete_own(&id, &account).await?;
    Ok(HttpResponse::NoContent().finish())
}
