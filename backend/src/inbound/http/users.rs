//! Account API handlers.
//!
//! ```text
//! POST /api/v1/auth/signup  {"email":"ada@example.com","password":"secret1","firstName":"Ada","lastName":"Lovelace"}
//! POST /api/v1/auth/signin  {"email":"ada@example.com","password":"secret1"}
//! POST /api/v1/auth/signout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::AuthenticatedSession;
use crate::domain::{
    CredentialsValidationError, Error, LoginCredentials, SignupCredentials, SignupParts,
    UserProfileView, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionContext, expired_token_cookie, token_cookie};
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/v1/auth/signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(min_length = 6)]
    pub password: String,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Body of `POST /api/v1/auth/signin`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Token and profile returned after signup or signin. The same token is
/// also set as the `jwt_token` cookie.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfileView,
}

impl From<AuthenticatedSession> for AuthResponse {
    fn from(session: AuthenticatedSession) -> Self {
        Self {
            token: session.token.token,
            expires_at: session.token.expires_at,
            user: session.user,
        }
    }
}

fn credentials_error(err: CredentialsValidationError) -> Error {
    let (field, code) = match &err {
        CredentialsValidationError::InvalidEmail => ("email", "invalid_email"),
        CredentialsValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialsValidationError::PasswordTooShort { .. } => ("password", "password_too_short"),
        CredentialsValidationError::User(UserValidationError::MissingField { field }) => {
            let field = match *field {
                "first name" => "firstName",
                "last name" => "lastName",
                other => other,
            };
            (field, "missing_field")
        }
        CredentialsValidationError::User(
            UserValidationError::UsernameLength { .. }
            | UserValidationError::UsernameInvalidCharacters,
        ) => ("username", "invalid_username"),
        CredentialsValidationError::User(_) => ("user", "invalid_user"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn session_response(
    mut builder: actix_web::HttpResponseBuilder,
    state: &HttpState,
    session: AuthenticatedSession,
) -> HttpResponse {
    builder
        .cookie(token_cookie(&session.token, &state.cookies))
        .json(AuthResponse::from(session))
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "jwt_token cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials = SignupCredentials::try_from_parts(SignupParts {
        email: &body.email,
        password: &body.password,
        first_name: &body.first_name,
        last_name: &body.last_name,
        username: body.username.as_deref(),
        avatar_url: body.avatar_url.as_deref(),
    })
    .map_err(credentials_error)?;
    let session = state.accounts.signup(credentials).await?;
    Ok(session_response(HttpResponse::Created(), &state, session))
}

/// Verify credentials and issue a token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "jwt_token cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid email or password", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signin",
    security([])
)]
#[post("/auth/signin")]
pub async fn signin(
    state: web::Data<HttpState>,
    payload: web::Json<SigninRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&body.email, &body.password).map_err(credentials_error)?;
    let session = state.accounts.signin(credentials).await?;
    Ok(session_response(HttpResponse::Ok(), &state, session))
}

/// Expire the token cookie. Bearer tokens stay valid until they expire.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signout",
    responses((status = 204, description = "Cookie cleared")),
    tags = ["auth"],
    operation_id = "signout",
    security([])
)]
#[post("/auth/signout")]
pub async fn signout(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(expired_token_cookie(&state.cookies))
        .finish()
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfileView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfileView>> {
    let user_id = session.require_user_id()?;
    let profile = state.accounts.current_user(user_id).await?;
    Ok(web::Json(profile))
}

#[cfg(test)]
mod tests;
