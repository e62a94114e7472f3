//! Authentication handlers.
//!
//! ```text
//! POST /api/v1/auth/login {"email":"yuki@example.com","password":"..."}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```
//!
//! Login establishes a cookie session carrying the account id; the rest of
//! the identity is resolved per request through the accounts port.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::auth::{Account, LoginCredentials, LoginValidationError, Role};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Account identity returned by login and `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountBody {
    /// Stable account identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalised email.
    pub email: String,
    /// `customer` or `admin`.
    pub role: String,
}

impl From<Account> for AccountBody {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name,
            email: account.email.to_string(),
            role: match account.role {
                Role::Customer => "customer".to_owned(),
                Role::Admin => "admin".to_owned(),
            },
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::Email(email_error) => {
            Error::invalid_request(email_error.to_string())
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        }
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Login success", body = AccountBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<AccountBody>> {
    let body = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&body.email, &body.password)
        .map_err(map_login_validation_error)?;
    let account = state
        .login
        .authenticate(&credentials)
        .await
        .map_err(|lookup_error| Error::internal(lookup_error.to_string()))?
        .ok_or_else(|| Error::unauthorized("invalid email or password"))?;
    session.persist_account(&account.id)?;
    Ok(web::Json(AccountBody::from(account)))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The current account identity.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = AccountBody),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentAccount"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AccountBody>> {
    let account = state.require_user(&session).await?;
    Ok(web::Json(AccountBody::from(account)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;

    use crate::domain::auth::{AccountId, Email};
    use crate::test_support::StaticAccounts;

    use super::*;

    fn demo_account() -> Account {
        Account {
            id: AccountId::random(),
            name: "Yuki Tanaka".to_owned(),
            email: Email::new("yuki@example.com").expect("valid"),
            role: Role::Customer,
        }
    }

    fn app_state() -> HttpState {
        let directory = Arc::new(StaticAccounts::new(vec![(
            demo_account(),
            "correct horse".to_owned(),
        )]));
        HttpState {
            login: Arc::clone(&directory) as Arc<dyn crate::domain::ports::LoginService>,
            accounts: directory,
            ..HttpState::default()
        }
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(web::scope("/api/v1").service(login).service(logout).service(me))
    }

    #[rstest]
    #[actix_web::test]
    async fn login_issues_a_usable_session() {
        let app = actix_test::init_service(test_app(app_state())).await;

        let login_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(&LoginRequestBody {
                    email: "Yuki@Example.com".to_owned(),
                    password: "correct horse".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();
        let body: AccountBody = actix_test::read_body_json(login_res).await;
        assert_eq!(body.email, "yuki@example.com");
        assert_eq!(body.role, "customer");

        let me_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/auth/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let app = actix_test::init_service(test_app(app_state())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(&LoginRequestBody {
                    email: "yuki@example.com".to_owned(),
                    password: "wrong".to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("", "pw", "invalid_email")]
    #[case("not-an-email", "pw", "invalid_email")]
    #[case("a@b.example", "", "empty_password")]
    #[actix_web::test]
    async fn malformed_credentials_are_rejected(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected_code: &str,
    ) {
        let app = actix_test::init_service(test_app(app_state())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(&LoginRequestBody {
                    email: email.to_owned(),
                    password: password.to_owned(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], expected_code);
    }

    #[rstest]
    #[actix_web::test]
    async fn me_without_session_is_unauthorised() {
        let app = actix_test::init_service(test_app(app_state())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/auth/me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
