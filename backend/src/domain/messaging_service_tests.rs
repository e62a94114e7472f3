//! Behaviour coverage for the messaging workflows.

use std::sync::Arc;

use chrono::Datelike;
use mockable::DefaultClock;
use rstest::rstest;
use uuid::Uuid;

use crate::domain::ErrorCode;
use crate::domain::auth::{Account, AccountId, Email, Role};
use crate::domain::message::{AuthorRole, MessageDraft, MessageKind, RequestStatus};
use crate::domain::ports::{
    MessageListFilter, MessagingCommand, MessagingQuery, MonthWindow,
};
use crate::domain::{MessagingCommandService, MessagingQueryService};
use crate::test_support::InMemoryMessageRepository;

fn email(raw: &str) -> Email {
    Email::new(raw).expect("valid")
}

fn account(address: &str) -> Account {
    Account {
        id: AccountId::random(),
        name: "Yuki Tanaka".to_owned(),
        email: email(address),
        role: Role::Customer,
    }
}

fn contact_draft(address: &str) -> MessageDraft {
    MessageDraft::contact(
        "Yuki",
        email(address),
        "Shipping question",
        "When does my parcel leave?",
        Vec::new(),
    )
    .expect("valid draft")
}

struct Fixture {
    messages: Arc<InMemoryMessageRepository>,
    command: MessagingCommandService<InMemoryMessageRepository>,
    query: MessagingQueryService<InMemoryMessageRepository>,
}

fn fixture() -> Fixture {
    let messages = Arc::new(InMemoryMessageRepository::default());
    Fixture {
        messages: Arc::clone(&messages),
        command: MessagingCommandService::new(Arc::clone(&messages), Arc::new(DefaultClock)),
        query: MessagingQueryService::new(messages),
    }
}

#[rstest]
#[actix_rt::test]
async fn submitted_threads_start_unread_and_unarchived() {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");

    assert_eq!(thread.kind, MessageKind::Contact);
    assert!(!thread.read);
    assert!(!thread.archived);
    assert_eq!(thread.status, RequestStatus::Pending);
    assert!(thread.replies.is_empty());
    assert!(f.messages.message(&thread.id).is_some());
}

#[rstest]
#[actix_rt::test]
async fn second_thread_for_one_order_is_a_conflict() {
    let f = fixture();
    let order_id = Uuid::new_v4();
    let draft = |subject: &str| {
        MessageDraft::order_thread(
            "Yuki",
            email("yuki@example.com"),
            order_id,
            subject.to_owned(),
            "Tea x1 - $10.00".to_owned(),
        )
        .expect("valid draft")
    };

    f.command
        .submit(draft("Order #12345678"))
        .await
        .expect("first thread");
    let error = f
        .command
        .submit(draft("Order #12345678"))
        .await
        .expect_err("duplicate rejected");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[actix_rt::test]
async fn read_toggle_flips_both_ways() {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");

    let read = f.command.toggle_read(&thread.id).await.expect("toggled");
    assert!(read.read);
    let unread = f.command.toggle_read(&thread.id).await.expect("toggled");
    assert!(!unread.read);
}

#[rstest]
#[actix_rt::test]
async fn admin_replies_append_and_mark_read() {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");

    let updated = f
        .command
        .admin_reply(&thread.id, "It ships tomorrow.", "Sakura Admin")
        .await
        .expect("replied");

    assert!(updated.read);
    assert_eq!(updated.replies.len(), 1);
    assert_eq!(updated.replies[0].author_role, AuthorRole::Admin);
    assert_eq!(updated.replies[0].author_name, "Sakura Admin");
}

#[rstest]
#[actix_rt::test]
async fn user_replies_require_the_matching_email() {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");

    let owner = account("yuki@example.com");
    let updated = f
        .command
        .user_reply(&thread.id, "Thanks!", &owner)
        .await
        .expect("owner may reply");
    assert_eq!(updated.replies.len(), 1);
    assert_eq!(updated.replies[0].author_role, AuthorRole::User);
    // A customer reply leaves the admin read flag alone.
    assert!(!updated.read);

    let stranger = account("mallory@example.com");
    let error = f
        .command
        .user_reply(&thread.id, "Let me in", &stranger)
        .await
        .expect_err("stranger rejected");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[actix_rt::test]
async fn reply_history_is_append_only_and_ordered() {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");
    let owner = account("yuki@example.com");

    f.command
        .admin_reply(&thread.id, "First answer", "Sakura Admin")
        .await
        .expect("replied");
    let updated = f
        .command
        .user_reply(&thread.id, "Follow-up", &owner)
        .await
        .expect("replied");

    assert_eq!(updated.replies.len(), 2);
    assert_eq!(updated.replies[0].text, "First answer");
    assert_eq!(updated.replies[1].text, "Follow-up");
}

#[rstest]
#[actix_rt::test]
async fn blank_reply_text_is_rejected() {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");
    let error = f
        .command
        .admin_reply(&thread.id, "   ", "Sakura Admin")
        .await
        .expect_err("blank rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(RequestStatus::Reviewing)]
#[case(RequestStatus::Available)]
#[case(RequestStatus::Replied)]
#[case(RequestStatus::Closed)]
#[actix_rt::test]
async fn any_request_status_may_be_set(#[case] status: RequestStatus) {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");
    let updated = f
        .command
        .set_status(&thread.id, status)
        .await
        .expect("status set");
    assert_eq!(updated.status, status);
}

#[rstest]
#[actix_rt::test]
async fn customers_may_delete_only_their_own_threads() {
    let f = fixture();
    let thread = f
        .command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");

    let stranger = account("mallory@example.com");
    let error = f
        .command
        .delete_own(&thread.id, &stranger)
        .await
        .expect_err("stranger rejected");
    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert!(f.messages.message(&thread.id).is_some());

    let owner = account("yuki@example.com");
    f.command
        .delete_own(&thread.id, &owner)
        .await
        .expect("owner may delete");
    assert!(f.messages.message(&thread.id).is_none());
}

#[rstest]
#[actix_rt::test]
async fn unread_count_ignores_read_and_archived_threads() {
    let f = fixture();
    let first = f
        .command
        .submit(contact_draft("a@example.com"))
        .await
        .expect("submitted");
    let second = f
        .command
        .submit(contact_draft("b@example.com"))
        .await
        .expect("submitted");
    f.command
        .submit(contact_draft("c@example.com"))
        .await
        .expect("submitted");

    f.command.toggle_read(&first.id).await.expect("read");
    f.command
        .toggle_archive(&second.id)
        .await
        .expect("archived");

    assert_eq!(f.query.unread_count().await.expect("counts"), 1);
}

#[rstest]
#[actix_rt::test]
async fn admin_list_filters_kind_archive_and_month() {
    let f = fixture();
    let contact = f
        .command
        .submit(contact_draft("a@example.com"))
        .await
        .expect("submitted");
    let request = f
        .command
        .submit(
            MessageDraft::request(
                "Yuki",
                email("b@example.com"),
                "Regional Kit Kat",
                Some("Snacks & Sweets"),
                None,
                Some("under $30"),
                None,
                Vec::new(),
            )
            .expect("valid draft"),
        )
        .await
        .expect("submitted");
    f.command
        .toggle_archive(&contact.id)
        .await
        .expect("archived");

    let live = f
        .query
        .admin_list(&MessageListFilter::default())
        .await
        .expect("lists");
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].id, request.id);

    let archived = f
        .query
        .admin_list(&MessageListFilter {
            archived: true,
            ..MessageListFilter::default()
        })
        .await
        .expect("lists");
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, contact.id);

    let requests_only = f
        .query
        .admin_list(&MessageListFilter {
            kind: Some(MessageKind::Request),
            ..MessageListFilter::default()
        })
        .await
        .expect("lists");
    assert_eq!(requests_only.len(), 1);

    let now = chrono::Utc::now();
    let this_month = f
        .query
        .admin_list(&MessageListFilter {
            created_in: Some(MonthWindow {
                year: now.year(),
                month: now.month(),
            }),
            ..MessageListFilter::default()
        })
        .await
        .expect("lists");
    assert_eq!(this_month.len(), 1);

    let last_year = f
        .query
        .admin_list(&MessageListFilter {
            created_in: Some(MonthWindow {
                year: now.year() - 1,
                month: now.month(),
            }),
            ..MessageListFilter::default()
        })
        .await
        .expect("lists");
    assert!(last_year.is_empty());
}

#[rstest]
#[actix_rt::test]
async fn mine_is_scoped_to_the_caller_email() {
    let f = fixture();
    f.command
        .submit(contact_draft("yuki@example.com"))
        .await
        .expect("submitted");
    f.command
        .submit(contact_draft("hana@example.com"))
        .await
        .expect("submitted");

    let mine = f
        .query
        .mine(&account("yuki@example.com"))
        .await
        .expect("lists");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].email.as_str(), "yuki@example.com");
}
