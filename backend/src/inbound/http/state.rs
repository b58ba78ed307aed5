//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see domain ports, so
//! they can be exercised with mocks and in-memory adapters.

use std::sync::Arc;

use actix_web::cookie::SameSite;
use chrono::Duration;

use crate::domain::ports::{AccountService, ListCommand, ListQuery, TokenService};

/// Attributes applied to the `jwt_token` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSite,
    /// Cookie lifetime; matches the token lifetime.
    pub max_age: Duration,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Lax,
            max_age: Duration::hours(24),
        }
    }
}

/// Port implementations consumed by the handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountService>,
    pub tokens: Arc<dyn TokenService>,
    pub lists: Arc<dyn ListCommand>,
    pub lists_query: Arc<dyn ListQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub tokens: Arc<dyn TokenService>,
    pub lists: Arc<dyn ListCommand>,
    pub lists_query: Arc<dyn ListQuery>,
    pub cookies: CookieSettings,
}

impl HttpState {
    /// Bundle the ports with cookie settings.
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use grocer::inbound::http::state::{CookieSettings, HttpState, HttpStatePorts};
    /// # fn ports() -> HttpStatePorts { unimplemented!() }
    ///
    /// let state = HttpState::new(ports(), CookieSettings::default());
    /// assert!(state.cookies.secure);
    /// ```
    pub fn new(ports: HttpStatePorts, cookies: CookieSettings) -> Self {
        let HttpStatePorts {
            accounts,
            tokens,
            lists,
            lists_query,
        } = ports;
        Self {
            accounts,
            tokens,
            lists,
            lists_query,
            cookies,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, CookieSettings::default())
    }
}
