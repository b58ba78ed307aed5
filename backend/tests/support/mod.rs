//! Shared application harness for HTTP integration tests.
//!
//! Wires the real list and account services over the in-memory stores. The
//! password hasher is a plain-text double so signup stays fast in debug
//! builds.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::Duration;
use mockable::{Clock, DefaultClock};
use serde_json::Value;

use grocer::Trace;
use grocer::domain::ports::{PasswordHashError, PasswordHasher};
use grocer::domain::{AccountManager, ListService};
use grocer::inbound::http::health::{HealthState, live, ready};
use grocer::inbound::http::lists;
use grocer::inbound::http::state::{CookieSettings, HttpState, HttpStatePorts};
use grocer::inbound::http::users::{current_user, signin, signout, signup};
use grocer::inbound::http::validation::json_error_handler;
use grocer::outbound::memory::{InMemoryListRepository, InMemoryUserRepository};
use grocer::outbound::security::JwtTokenService;

const TEST_SECRET: &[u8] = b"integration-test-secret-with-enough-bytes";

/// Stores passwords with a prefix instead of hashing them.
pub struct PlainHasher;

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        Ok(format!("plain:{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}

/// HTTP state backed by fresh in-memory stores.
pub fn http_state() -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(JwtTokenService::new(
        TEST_SECRET,
        Duration::hours(1),
        Arc::clone(&clock),
    ));
    let lists = Arc::new(ListService::new(
        Arc::new(InMemoryListRepository::new()),
        Arc::clone(&clock),
    ));
    let accounts = Arc::new(AccountManager::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(PlainHasher),
        tokens.clone(),
        clock,
    ));
    let ports = HttpStatePorts {
        accounts,
        tokens,
        lists: lists.clone(),
        lists_query: lists,
    };
    let cookies = CookieSettings {
        secure: false,
        ..CookieSettings::default()
    };
    web::Data::new(HttpState::new(ports, cookies))
}

/// Application with the production route table over `state`.
pub fn app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    App::new()
        .app_data(state)
        .app_data(health)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .service(signup)
                .service(signin)
                .service(signout)
                .service(current_user)
                .configure(lists::configure),
        )
        .service(ready)
        .service(live)
}

/// Signup payload for a throwaway account.
pub fn signup_body(email: &str, first_name: &str) -> Value {
    serde_json::json!({
        "email": email,
        "password": "correct horse",
        "firstName": first_name,
        "lastName": "Tester",
    })
}
