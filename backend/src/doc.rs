//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every list, auth, and health endpoint together with
//! the request and response schemas. Both bearer tokens and the `jwt_token`
//! cookie are declared as security schemes; the auth routes opt out.
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported by the `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::lists::{ListItem, ShoppingList};
use crate::domain::{Error, ErrorCode, UserProfileView};
use crate::inbound::http::health::ProbeStatus;
use crate::inbound::http::lists::{
    AddItemBody, CreateListBody, ItemIndexBody, ItemPatchBody, UpdateListBody,
};
use crate::inbound::http::users::{AuthResponse, SigninRequest, SignupRequest};

/// Adds the bearer and cookie security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "TokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "jwt_token",
                "Token cookie set by POST /api/v1/auth/signin.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Grocer API",
        description = "Shared grocery lists with owner and collaborator access.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = []), ("TokenCookie" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::signin,
        crate::inbound::http::users::signout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::lists::list_lists,
        crate::inbound::http::lists::create_list,
        crate::inbound::http::lists::get_list,
        crate::inbound::http::lists::update_list,
        crate::inbound::http::lists::delete_list,
        crate::inbound::http::lists::add_item,
        crate::inbound::http::lists::update_item,
        crate::inbound::http::lists::delete_item,
        crate::inbound::http::lists::share_list,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ShoppingList,
        ListItem,
        Error,
        ErrorCode,
        UserProfileView,
        CreateListBody,
        UpdateListBody,
        AddItemBody,
        ItemPatchBody,
        ItemIndexBody,
        SignupRequest,
        SigninRequest,
        AuthResponse,
        ProbeStatus,
    )),
    tags(
        (name = "lists", description = "Shopping lists and sharing"),
        (name = "items", description = "Positional item edits within a list"),
        (name = "auth", description = "Account signup, signin, and session"),
        (name = "health", description = "Readiness and liveness probes")
    )
)]
pub struct ApiDoc;
