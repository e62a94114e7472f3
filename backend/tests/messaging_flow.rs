//! End-to-end messaging coverage over the HTTP surface.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use support::{backend_with_products, login, spawn_app};

fn contact_body(email: &str) -> Value {
    json!({
        "type": "contact",
        "name": "Yuki Tanaka",
        "email": email,
        "subject": "Shipping question",
        "message": "When does my parcel leave?"
    })
}

#[actix_web::test]
async fn public_submission_creates_an_unread_thread() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/messages")
            .set_json(contact_body("yuki@example.com"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let thread: Value = test::read_body_json(response).await;
    assert_eq!(thread["type"], "contact");
    assert_eq!(thread["read"], false);
    assert_eq!(thread["archived"], false);
    assert_eq!(thread["status"], "pending");

    let admin = login(&app, "admin@example.com").await;
    let unread = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/messages/unread-count")
            .cookie(admin)
            .to_request(),
    )
    .await;
    let badge: Value = test::read_body_json(unread).await;
    assert_eq!(badge["unread"], 1);
}

#[actix_web::test]
async fn submissions_are_rate_limited_per_client() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;

    for _ in 0..10 {
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/messages")
                .peer_addr(std::net::SocketAddr::from(([10, 0, 0, 1], 4000)))
                .set_json(contact_body("yuki@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let throttled = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/messages")
            .peer_addr(std::net::SocketAddr::from(([10, 0, 0, 1], 4000)))
            .set_json(contact_body("yuki@example.com"))
            .to_request(),
    )
    .await;
    assert_eq!(throttled.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different client is unaffected.
    let other = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/messages")
            .peer_addr(std::net::SocketAddr::from(([10, 0, 0, 2], 4000)))
            .set_json(contact_body("hana@example.com"))
            .to_request(),
    )
    .await;
    assert_eq!(other.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn order_type_submissions_are_rejected() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;

    let mut body = contact_body("yuki@example.com");
    body["type"] = json!("order");
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/messages")
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn mine_is_scoped_to_the_session_email() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;
    for email in ["yuki@example.com", "hana@example.com"] {
        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/messages")
                .set_json(contact_body(email))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let session = login(&app, "yuki@example.com").await;
    let mine = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/messages/mine")
            .cookie(session)
            .to_request(),
    )
    .await;
    let threads: Value = test::read_body_json(mine).await;
    let threads = threads.as_array().expect("array");
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["email"], "yuki@example.com");
}

async fn submit(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
) -> String {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/messages")
            .set_json(contact_body(email))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let thread: Value = test::read_body_json(response).await;
    thread["id"].as_str().expect("id").to_owned()
}

#[actix_web::test]
async fn admin_replies_mark_the_thread_read() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;
    let thread_id = submit(&app, "yuki@example.com").await;
    let admin = login(&app, "admin@example.com").await;

    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/messages/{thread_id}/reply"))
            .cookie(admin)
            .set_json(json!({ "text": "It ships tomorrow." }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let thread: Value = test::read_body_json(response).await;
    assert_eq!(thread["read"], true);
    assert_eq!(thread["replies"][0]["authorRole"], "admin");
    assert_eq!(thread["replies"][0]["authorName"], "Sakura Admin");
}

#[actix_web::test]
async fn customers_reply_only_to_their_own_threads() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;
    let thread_id = submit(&app, "yuki@example.com").await;

    let owner = login(&app, "yuki@example.com").await;
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/messages/mine/{thread_id}/reply"))
            .cookie(owner)
            .set_json(json!({ "text": "Thanks!" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stranger = login(&app, "hana@example.com").await;
    let forbidden = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/messages/mine/{thread_id}/reply"))
            .cookie(stranger)
            .set_json(json!({ "text": "Let me in" }))
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn customers_delete_only_their_own_threads() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;
    let thread_id = submit(&app, "yuki@example.com").await;

    let stranger = login(&app, "hana@example.com").await;
    let forbidden = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/messages/mine/{thread_id}"))
            .cookie(stranger)
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.messages.len(), 1);

    let owner = login(&app, "yuki@example.com").await;
    let deleted = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/messages/mine/{thread_id}"))
            .cookie(owner)
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(backend.messages.is_empty());
}

#[actix_web::test]
async fn admin_listing_is_admin_only_and_filters_by_type() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;
    submit(&app, "yuki@example.com").await;
    let request_submission = json!({
        "type": "request",
        "name": "Hana Sato",
        "email": "hana@example.com",
        "itemName": "Regional Kit Kat",
        "budget": "under $30"
    });
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/messages")
            .set_json(request_submission)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Customers may not read the console listing.
    let customer = login(&app, "yuki@example.com").await;
    let forbidden = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/messages")
            .cookie(customer)
            .to_request(),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let admin = login(&app, "admin@example.com").await;
    let all = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/messages")
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    let all: Value = test::read_body_json(all).await;
    assert_eq!(all.as_array().expect("array").len(), 2);

    let requests_only = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/messages?type=request")
            .cookie(admin)
            .to_request(),
    )
    .await;
    let requests_only: Value = test::read_body_json(requests_only).await;
    let requests_only = requests_only.as_array().expect("array");
    assert_eq!(requests_only.len(), 1);
    assert_eq!(requests_only[0]["itemName"], "Regional Kit Kat");
}

#[actix_web::test]
async fn request_status_and_archive_toggles_work() {
    let backend = backend_with_products(Vec::new());
    let app = spawn_app(&backend).await;
    let thread_id = submit(&app, "yuki@example.com").await;
    let admin = login(&app, "admin@example.com").await;

    let status = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/messages/{thread_id}/status"))
            .cookie(admin.clone())
            .set_json(json!({ "status": "reviewing" }))
            .to_request(),
    )
    .await;
    assert_eq!(status.status(), StatusCode::OK);
    let thread: Value = test::read_body_json(status).await;
    assert_eq!(thread["status"], "reviewing");

    let archived = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/messages/{thread_id}/archive"))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(archived.status(), StatusCode::OK);

    // Archived threads leave the default listing and the unread badge.
    let live = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/messages")
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    let live: Value = test::read_body_json(live).await;
    assert!(live.as_array().expect("array").is_empty());

    let unread = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/messages/unread-count")
            .cookie(admin)
            .to_request(),
    )
    .await;
    let badge: Value = test::read_body_json(unread).await;
    assert_eq!(badge["unread"], 0);
}
