//! Request authentication from bearer tokens or the `jwt_token` cookie.
//!
//! Handlers take a [`SessionContext`] and decide themselves whether an
//! anonymous caller is acceptable, so extraction never fails on a missing or
//! bad token.

use actix_web::cookie::{Cookie, time::Duration as CookieDuration};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::IssuedToken;
use crate::domain::{Error, UserId};

use super::state::{CookieSettings, HttpState};

/// Name of the HTTP-only cookie carrying the access token.
pub const TOKEN_COOKIE: &str = "jwt_token";
const BEARER_PREFIX: &str = "Bearer ";
const AUTH_REQUIRED: &str = "authentication required";
const TOKEN_REJECTED: &str = "invalid or expired token";

/// Caller identity resolved for the current request.
///
/// An anonymous context remembers whether a token was presented and
/// rejected so handlers can tell the caller why they were refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    user_id: Option<UserId>,
    token_rejected: bool,
}

/// 401 messages for a missing token and for a rejected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthMessages {
    pub missing: &'static str,
    pub rejected: &'static str,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            token_rejected: false,
        }
    }

    /// Anonymous caller whose token failed verification.
    pub fn rejected() -> Self {
        Self {
            user_id: None,
            token_rejected: true,
        }
    }

    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            token_rejected: false,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn token_rejected(&self) -> bool {
        self.token_rejected
    }

    /// Require a verified caller or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.require_user_id_with(AuthMessages {
            missing: AUTH_REQUIRED,
            rejected: TOKEN_REJECTED,
        })
    }

    /// As [`Self::require_user_id`] with route-specific messages.
    pub fn require_user_id_with(&self, messages: AuthMessages) -> Result<UserId, Error> {
        self.user_id.ok_or_else(|| {
            Error::unauthorized(if self.token_rejected {
                messages.rejected
            } else {
                messages.missing
            })
        })
    }
}

/// Token from `Authorization: Bearer`, falling back to the cookie.
fn request_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned);
    bearer.or_else(|| {
        req.cookie(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .filter(|token| !token.is_empty())
    })
}

fn resolve(req: &HttpRequest) -> Result<SessionContext, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let Some(token) = request_token(req) else {
        return Ok(SessionContext::anonymous());
    };
    match state.tokens.verify(&token) {
        Ok(user_id) => Ok(SessionContext::authenticated(user_id)),
        Err(error) => {
            debug!(%error, "rejected access token");
            Ok(SessionContext::rejected())
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map_err(actix_web::Error::from))
    }
}

fn cookie_duration(max_age: chrono::Duration) -> CookieDuration {
    CookieDuration::seconds(max_age.num_seconds())
}

/// HTTP-only cookie carrying a freshly issued token.
pub(crate) fn token_cookie(token: &IssuedToken, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.token.clone())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(settings.same_site)
        .max_age(cookie_duration(settings.max_age))
        .finish()
}

/// Cookie that makes the browser drop the token.
pub(crate) fn expired_token_cookie(settings: &CookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(settings.same_site)
        .finish();
    cookie.make_removal();
    cookie
}
