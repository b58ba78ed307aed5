//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockAccountService, MockListCommand, MockListQuery, MockTokenService,
};

use super::state::{CookieSettings, HttpState, HttpStatePorts};

/// Mocked ports; set expectations before calling [`state_from`].
#[derive(Default)]
pub struct TestPorts {
    pub accounts: MockAccountService,
    pub tokens: MockTokenService,
    pub lists: MockListCommand,
    pub lists_query: MockListQuery,
}

/// Wrap mocked ports in `web::Data`. Cookies are not marked `Secure` so
/// plain HTTP test requests keep them.
pub fn state_from(ports: TestPorts) -> web::Data<HttpState> {
    let TestPorts {
        accounts,
        tokens,
        lists,
        lists_query,
    } = ports;
    web::Data::new(HttpState::new(
        HttpStatePorts {
            accounts: Arc::new(accounts),
            tokens: Arc::new(tokens),
            lists: Arc::new(lists),
            lists_query: Arc::new(lists_query),
        },
        CookieSettings {
            secure: false,
            ..CookieSettings::default()
        },
    ))
}
