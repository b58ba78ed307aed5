//! Shopping list HTTP handlers.
//!
//! ```text
//! GET    /api/v1/lists
//! POST   /api/v1/lists                {"name":"Groceries","description":"Weekly shop"}
//! GET    /api/v1/lists/{id}
//! PUT    /api/v1/lists/{id}           {"name":"Party"}
//! DELETE /api/v1/lists/{id}
//! POST   /api/v1/lists/{id}/items     {"name":"Milk","quantity":2,"details":"semi-skimmed"}
//! PATCH  /api/v1/lists/{id}/items     {"index":0,"checked":true}
//! DELETE /api/v1/lists/{id}/items     {"index":0}
//! POST   /api/v1/lists/{id}/share
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::lists::{ListId, ShoppingList};
use crate::domain::ports::{
    AddItemRequest, CreateListRequest, UpdateItemRequest, UpdateListRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{AuthMessages, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_list_id, require_index};

/// Reported when an anonymous caller follows a share link.
pub const SHARE_AUTH_REQUIRED: &str =
    "Authentication required. Please sign in to join this list.";
/// Reported when a share link is followed with a bad or expired token.
pub const SHARE_TOKEN_REJECTED: &str =
    "Invalid or expired token. Please sign in to join this list.";

/// Body of `POST /api/v1/lists`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListBody {
    #[schema(example = "Groceries")]
    pub name: Option<String>,
    #[schema(example = "Weekly shop")]
    pub description: Option<String>,
}

/// Body of `PUT /api/v1/lists/{id}`. Absent or blank fields keep their
/// stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListBody {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Body of `POST /api/v1/lists/{id}/items`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    #[schema(example = "Milk")]
    pub name: Option<String>,
    /// Missing or non-positive values become 1.
    #[schema(example = 2)]
    pub quantity: Option<i64>,
    #[schema(max_length = 512, example = "semi-skimmed")]
    pub details: Option<String>,
}

/// Body of `PATCH /api/v1/lists/{id}/items`.
///
/// `checked` toggles the flag; `name`, `quantity` and `details` update the
/// item. An empty `details` string clears it. All supplied fields are
/// applied together or not at all.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatchBody {
    #[schema(example = 0)]
    pub index: Option<i64>,
    pub checked: Option<bool>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub details: Option<String>,
}

impl ItemPatchBody {
    fn has_field_updates(&self) -> bool {
        self.name.is_some() || self.quantity.is_some() || self.details.is_some()
    }
}

/// Body of `DELETE /api/v1/lists/{id}/items`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemIndexBody {
    #[schema(example = 0)]
    pub index: Option<i64>,
}

fn list_id(path: web::Path<String>) -> Result<ListId, Error> {
    parse_list_id(&path.into_inner())
}

/// Lists owned by or shared with the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/lists",
    responses(
        (status = 200, description = "Visible lists", body = [ShoppingList]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["lists"],
    operation_id = "listLists"
)]
#[get("/lists")]
pub async fn list_lists(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ShoppingList>>> {
    let actor = session.require_user_id()?;
    let lists = state.lists_query.lists_visible_to(actor).await?;
    Ok(web::Json(lists))
}

/// Create an empty list owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/lists",
    request_body = CreateListBody,
    responses(
        (status = 201, description = "List created", body = ShoppingList),
        (status = 400, description = "Name missing", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["lists"],
    operation_id = "createList"
)]
#[post("/lists")]
pub async fn create_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateListBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let body = payload.into_inner();
    let list = state
        .lists
        .create_list(
            actor,
            CreateListRequest {
                name: body.name.unwrap_or_default(),
                description: body.description.unwrap_or_default(),
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(list))
}

/// Fetch one list. Owner or shared users only.
#[utoipa::path(
    get,
    path = "/api/v1/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    responses(
        (status = 200, description = "List", body = ShoppingList),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a member", body = Error),
        (status = 404, description = "No such list", body = Error)
    ),
    tags = ["lists"],
    operation_id = "getList"
)]
#[get("/lists/{id}")]
pub async fn get_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ShoppingList>> {
    let actor = session.require_user_id()?;
    let list_id = list_id(path)?;
    let list = state.lists_query.get_list(list_id, actor).await?;
    Ok(web::Json(list))
}

/// Rename or re-describe a list. Shared users may do this too.
#[utoipa::path(
    put,
    path = "/api/v1/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    request_body = UpdateListBody,
    responses(
        (status = 200, description = "Updated list", body = ShoppingList),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a member", body = Error),
        (status = 404, description = "No such list", body = Error)
    ),
    tags = ["lists"],
    operation_id = "updateList"
)]
#[put("/lists/{id}")]
pub async fn update_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateListBody>,
) -> ApiResult<web::Json<ShoppingList>> {
    let actor = session.require_user_id()?;
    let list_id = list_id(path)?;
    let body = payload.into_inner();
    let list = state
        .lists
        .update_list_metadata(
            list_id,
            actor,
            UpdateListRequest {
                name: body.name,
                description: body.description,
            },
        )
        .await?;
    Ok(web::Json(list))
}

/// Delete a list. Owner only.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{id}",
    params(("id" = String, Path, description = "List identifier")),
    responses(
        (status = 204, description = "List deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Only the owner may delete", body = Error),
        (status = 404, description = "No such list", body = Error)
    ),
    tags = ["lists"],
    operation_id = "deleteList"
)]
#[delete("/lists/{id}")]
pub async fn delete_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let list_id = list_id(path)?;
    state.lists.delete_list(list_id, actor).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Append an item to the tail of a list.
#[utoipa::path(
    post,
    path = "/api/v1/lists/{id}/items",
    params(("id" = String, Path, description = "List identifier")),
    request_body = AddItemBody,
    responses(
        (status = 201, description = "Item added", body = ShoppingList),
        (status = 400, description = "Name missing or details too long", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a member", body = Error),
        (status = 404, description = "No such list", body = Error)
    ),
    tags = ["items"],
    operation_id = "addItem"
)]
#[post("/lists/{id}/items")]
pub async fn add_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AddItemBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let list_id = list_id(path)?;
    let body = payload.into_inner();
    let list = state
        .lists
        .add_item(
            list_id,
            actor,
            AddItemRequest {
                name: body.name.unwrap_or_default(),
                quantity: body.quantity,
                details: body.details,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(list))
}

/// Update or check off the item at `index`.
#[utoipa::path(
    patch,
    path = "/api/v1/lists/{id}/items",
    params(("id" = String, Path, description = "List identifier")),
    request_body = ItemPatchBody,
    responses(
        (status = 200, description = "Updated list", body = ShoppingList),
        (status = 400, description = "Index missing or out of range", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a member", body = Error),
        (status = 404, description = "No such list", body = Error),
        (status = 409, description = "List changed concurrently", body = Error)
    ),
    tags = ["items"],
    operation_id = "updateItem"
)]
#[patch("/lists/{id}/items")]
pub async fn update_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ItemPatchBody>,
) -> ApiResult<web::Json<ShoppingList>> {
    let actor = session.require_user_id()?;
    let list_id = list_id(path)?;
    let body = payload.into_inner();
    let index = require_index(body.index)?;
    // A bare toggle keeps its own operation; anything else is one write.
    let list = match (body.checked, body.has_field_updates()) {
        (Some(checked), false) => {
            state
                .lists
                .set_item_checked(list_id, actor, index, checked)
                .await?
        }
        _ => {
            let update = UpdateItemRequest {
                name: body.name,
                quantity: body.quantity,
                details: body.details,
                checked: body.checked,
            };
            state.lists.update_item(list_id, actor, index, update).await?
        }
    };
    Ok(web::Json(list))
}

/// Remove the item at `index`; later items shift down.
#[utoipa::path(
    delete,
    path = "/api/v1/lists/{id}/items",
    params(("id" = String, Path, description = "List identifier")),
    request_body = ItemIndexBody,
    responses(
        (status = 200, description = "Updated list", body = ShoppingList),
        (status = 400, description = "Index missing or out of range", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a member", body = Error),
        (status = 404, description = "No such list", body = Error),
        (status = 409, description = "List changed concurrently", body = Error)
    ),
    tags = ["items"],
    operation_id = "deleteItem"
)]
#[delete("/lists/{id}/items")]
pub async fn delete_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ItemIndexBody>,
) -> ApiResult<web::Json<ShoppingList>> {
    let actor = session.require_user_id()?;
    let list_id = list_id(path)?;
    let index = require_index(payload.into_inner().index)?;
    let list = state.lists.delete_item(list_id, actor, index).await?;
    Ok(web::Json(list))
}

/// Join a list through its share link.
#[utoipa::path(
    post,
    path = "/api/v1/lists/{id}/share",
    params(("id" = String, Path, description = "List identifier")),
    responses(
        (status = 200, description = "Caller is a member", body = ShoppingList),
        (status = 400, description = "Caller already owns the list", body = Error),
        (status = 401, description = "Sign in required", body = Error),
        (status = 404, description = "No such list", body = Error)
    ),
    tags = ["lists"],
    operation_id = "shareList"
)]
#[post("/lists/{id}/share")]
pub async fn share_list(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ShoppingList>> {
    let actor = session.require_user_id_with(AuthMessages {
        missing: SHARE_AUTH_REQUIRED,
        rejected: SHARE_TOKEN_REJECTED,
    })?;
    let list_id = list_id(path)?;
    let list = state.lists.share_list(list_id, actor).await?;
    Ok(web::Json(list))
}

/// Register every list route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_lists)
        .service(create_list)
        .service(get_list)
        .service(update_list)
        .service(delete_list)
        .service(add_item)
        .service(update_item)
        .service(delete_item)
        .service(share_list);
}

#[cfg(test)]
#[path = "lists_tests.rs"]
mod tests;
