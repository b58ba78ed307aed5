//! Tests for account API handlers.

use super::*;
use crate::domain::ports::IssuedToken;
use crate::domain::{ErrorCode, UserId};
use crate::inbound::http::session::TOKEN_COOKIE;
use crate::inbound::http::test_utils::{TestPorts, state_from};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test};
use chrono::TimeZone;
use rstest::rstest;
use serde_json::Value;

const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

fn profile() -> UserProfileView {
    UserProfileView {
        id: UserId::new(USER_ID).expect("fixture id"),
        email: "ada@example.com".into(),
        username: None,
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        avatar_url: None,
        created_at: Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("fixture time"),
    }
}

fn session() -> AuthenticatedSession {
    AuthenticatedSession {
        token: IssuedToken {
            token: "signed.jwt.token".into(),
            expires_at: Utc
                .with_ymd_and_hms(2026, 1, 2, 0, 0, 0)
                .single()
                .expect("fixture time"),
        },
        user: profile(),
    }
}

fn signup_body(password: &str, first_name: &str) -> Value {
    json!({
        "email": "Ada@Example.com",
        "password": password,
        "firstName": first_name,
        "lastName": "Lovelace",
    })
}

async fn call(ports: TestPorts, request: actix_test::TestRequest) -> actix_web::dev::ServiceResponse {
    let app = actix_test::init_service(
        App::new().app_data(state_from(ports)).service(
            web::scope("/api/v1")
                .service(signup)
                .service(signin)
                .service(signout)
                .service(current_user),
        ),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

async fn json_body(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}

#[actix_web::test]
async fn signup_sets_cookie_and_returns_profile() {
    let mut ports = TestPorts::default();
    ports
        .accounts
        .expect_signup()
        .withf(|credentials| credentials.email().as_ref() == "ada@example.com")
        .times(1)
        .returning(|_| Ok(session()));

    let response = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(signup_body("secret1", "Ada")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == TOKEN_COOKIE)
        .expect("token cookie set");
    assert_eq!(cookie.value(), "signed.jwt.token");
    assert_eq!(cookie.http_only(), Some(true));

    let body = json_body(response).await;
    assert_eq!(body["token"], "signed.jwt.token");
    assert_eq!(body["user"]["firstName"], "Ada");
    assert!(body["user"].get("passwordHash").is_none());
}

#[rstest]
#[case(signup_body("12345", "Ada"), "password", "password_too_short")]
#[case(signup_body("secret1", "  "), "firstName", "missing_field")]
#[case(json!({"email": "nope", "password": "secret1", "firstName": "A", "lastName": "B"}), "email", "invalid_email")]
#[actix_web::test]
async fn signup_validation_failures_name_the_field(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let response = call(
        TestPorts::default(),
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(body),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn duplicate_email_is_a_conflict() {
    let mut ports = TestPorts::default();
    ports
        .accounts
        .expect_signup()
        .returning(|_| Err(Error::conflict("an account with this email already exists")));

    let response = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(signup_body("secret1", "Ada")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn signin_failure_is_unauthorised_without_cookie() {
    let mut ports = TestPorts::default();
    ports
        .accounts
        .expect_signin()
        .returning(|_| Err(Error::unauthorized("invalid email or password")));

    let response = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signin")
            .set_json(json!({"email": "ada@example.com", "password": "wrong!"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.response().cookies().next().is_none());
    let body = json_body(response).await;
    assert_eq!(body["message"], "invalid email or password");
}

#[actix_web::test]
async fn signin_success_returns_token() {
    let mut ports = TestPorts::default();
    ports
        .accounts
        .expect_signin()
        .withf(|credentials| credentials.password() == "secret1")
        .returning(|_| Ok(session()));

    let response = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/signin")
            .set_json(json!({"email": "ada@example.com", "password": "secret1"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user"]["id"], USER_ID);
}

#[actix_web::test]
async fn signout_expires_the_cookie() {
    let response = call(
        TestPorts::default(),
        actix_test::TestRequest::post().uri("/api/v1/auth/signout"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == TOKEN_COOKIE)
        .expect("removal cookie");
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn me_requires_a_token() {
    let response = call(
        TestPorts::default(),
        actix_test::TestRequest::get().uri("/api/v1/auth/me"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[actix_web::test]
async fn me_returns_the_token_subject_profile() {
    let mut ports = TestPorts::default();
    ports
        .tokens
        .expect_verify()
        .returning(|_| Ok(UserId::new(USER_ID).expect("fixture id")));
    ports
        .accounts
        .expect_current_user()
        .withf(|id| id.to_string() == USER_ID)
        .returning(|_| Ok(profile()));

    let response = call(
        ports,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header((AUTHORIZATION, "Bearer signed.jwt.token")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["email"], "ada@example.com");
}

#[rstest]
fn credential_errors_map_to_invalid_request() {
    let err = credentials_error(CredentialsValidationError::PasswordTooShort { min: 6 });
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details(),
        Some(&json!({"field": "password", "code": "password_too_short"}))
    );
}
