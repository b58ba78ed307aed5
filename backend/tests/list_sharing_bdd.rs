//! Behaviour tests for joining and editing a shared list over HTTP.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

mod support;

use std::cell::RefCell;
use std::collections::HashMap;

use actix_web::http::{Method, header};
use actix_web::{test as actix_test, web};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use grocer::inbound::http::lists::SHARE_TOKEN_REJECTED;
use grocer::inbound::http::state::HttpState;

struct SharingWorld {
    runtime: Runtime,
    local: LocalSet,
    state: web::Data<HttpState>,
    tokens: HashMap<&'static str, String>,
    ids: HashMap<&'static str, String>,
    list_id: Option<String>,
    last_status: Option<u16>,
    last_body: Option<Value>,
    previous_body: Option<Value>,
}

pub(crate) struct WorldFixture {
    world: RefCell<SharingWorld>,
}

#[fixture]
fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    WorldFixture {
        world: RefCell::new(SharingWorld {
            runtime,
            local: LocalSet::new(),
            state: support::http_state(),
            tokens: HashMap::new(),
            ids: HashMap::new(),
            list_id: None,
            last_status: None,
            last_body: None,
            previous_body: None,
        }),
    }
}

struct Call {
    method: Method,
    path: String,
    actor: Option<&'static str>,
    bearer: Option<&'static str>,
    body: Option<Value>,
}

fn send(world: &WorldFixture, call: Call) -> (u16, Value) {
    let ctx = world.world.borrow();
    let state = ctx.state.clone();
    let token = call
        .actor
        .map(|name| ctx.tokens[name].clone())
        .or_else(|| call.bearer.map(str::to_owned));
    ctx.local.block_on(&ctx.runtime, async move {
        let app = actix_test::init_service(support::app(state)).await;
        let mut req = actix_test::TestRequest::default()
            .method(call.method)
            .uri(&call.path);
        if let Some(token) = token {
            req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
        }
        if let Some(body) = call.body {
            req = req.set_json(body);
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status().as_u16();
        let bytes = actix_test::read_body(res).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    })
}

fn record(world: &WorldFixture, call: Call) {
    let (status, body) = send(world, call);
    let mut ctx = world.world.borrow_mut();
    ctx.previous_body = ctx.last_body.take();
    ctx.last_status = Some(status);
    ctx.last_body = Some(body);
}

fn list_path(world: &WorldFixture, suffix: &str) -> String {
    let ctx = world.world.borrow();
    let list_id = ctx.list_id.as_deref().expect("list created");
    format!("/api/v1/lists/{list_id}{suffix}")
}

fn last_body(world: &WorldFixture) -> Value {
    world
        .world
        .borrow()
        .last_body
        .clone()
        .expect("response recorded")
}

fn last_status(world: &WorldFixture) -> u16 {
    world.world.borrow().last_status.expect("response recorded")
}

fn user_id(world: &WorldFixture, name: &str) -> String {
    world.world.borrow().ids[name].clone()
}

#[given("Alice and Bob have signed up")]
fn alice_and_bob_have_signed_up(world: &WorldFixture) {
    for (name, email) in [("Alice", "alice@example.com"), ("Bob", "bob@example.com")] {
        let (status, body) = send(
            world,
            Call {
                method: Method::POST,
                path: "/api/v1/auth/signup".to_owned(),
                actor: None,
                bearer: None,
                body: Some(support::signup_body(email, name)),
            },
        );
        assert_eq!(status, 201);
        let mut ctx = world.world.borrow_mut();
        ctx.tokens
            .insert(name, body["token"].as_str().expect("token").to_owned());
        ctx.ids
            .insert(name, body["user"]["id"].as_str().expect("id").to_owned());
    }
}

#[given("Alice has created a Groceries list")]
fn alice_has_created_a_groceries_list(world: &WorldFixture) {
    let (status, body) = send(
        world,
        Call {
            method: Method::POST,
            path: "/api/v1/lists".to_owned(),
            actor: Some("Alice"),
            bearer: None,
            body: Some(json!({ "name": "Groceries" })),
        },
    );
    assert_eq!(status, 201);
    world.world.borrow_mut().list_id = body["id"].as_str().map(str::to_owned);
}

#[when("Alice adds Milk to the list")]
fn alice_adds_milk_to_the_list(world: &WorldFixture) {
    let path = list_path(world, "/items");
    record(
        world,
        Call {
            method: Method::POST,
            path,
            actor: Some("Alice"),
            bearer: None,
            body: Some(json!({ "name": "Milk" })),
        },
    );
}

#[then("the list has one unchecked Milk item with quantity 1")]
fn the_list_has_one_unchecked_milk_item(world: &WorldFixture) {
    assert_eq!(last_status(world), 201);
    let body = last_body(world);
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], json!("Milk"));
    assert_eq!(items[0]["quantity"], json!(1));
    assert_eq!(items[0]["checked"], json!(false));
}

fn bob_joins(world: &WorldFixture) {
    let path = list_path(world, "/share");
    record(
        world,
        Call {
            method: Method::POST,
            path,
            actor: Some("Bob"),
            bearer: None,
            body: None,
        },
    );
}

#[when("Bob joins the list through its share link")]
fn bob_joins_the_list(world: &WorldFixture) {
    bob_joins(world);
}

#[when("Bob joins the list through its share link again")]
fn bob_joins_the_list_again(world: &WorldFixture) {
    bob_joins(world);
}

#[then("Bob is a shared user and Alice is still the owner")]
fn bob_is_shared_and_alice_owns(world: &WorldFixture) {
    assert_eq!(last_status(world), 200);
    let body = last_body(world);
    assert_eq!(body["ownerId"], json!(user_id(world, "Alice")));
    assert_eq!(body["sharedWith"], json!([user_id(world, "Bob")]));
}

#[then("Bob appears once in the shared users")]
fn bob_appears_once(world: &WorldFixture) {
    assert_eq!(last_status(world), 200);
    assert_eq!(
        last_body(world)["sharedWith"],
        json!([user_id(world, "Bob")])
    );
}

#[then("the second join did not touch the list")]
fn the_second_join_did_not_touch_the_list(world: &WorldFixture) {
    let ctx = world.world.borrow();
    let first = ctx.previous_body.as_ref().expect("first join");
    let second = ctx.last_body.as_ref().expect("second join");
    assert_eq!(first["updatedAt"], second["updatedAt"]);
    assert_eq!(first["revision"], second["revision"]);
}

#[when("Bob checks off the first item")]
fn bob_checks_off_the_first_item(world: &WorldFixture) {
    let path = list_path(world, "/items");
    record(
        world,
        Call {
            method: Method::PATCH,
            path,
            actor: Some("Bob"),
            bearer: None,
            body: Some(json!({ "index": 0, "checked": true })),
        },
    );
}

#[then("the first item is checked")]
fn the_first_item_is_checked(world: &WorldFixture) {
    assert_eq!(last_status(world), 200);
    assert_eq!(last_body(world)["items"][0]["checked"], json!(true));
}

#[when("Bob tries to delete the list")]
fn bob_tries_to_delete_the_list(world: &WorldFixture) {
    let path = list_path(world, "");
    record(
        world,
        Call {
            method: Method::DELETE,
            path,
            actor: Some("Bob"),
            bearer: None,
            body: None,
        },
    );
}

#[then("the request is forbidden")]
fn the_request_is_forbidden(world: &WorldFixture) {
    assert_eq!(last_status(world), 403);
    assert_eq!(last_body(world)["code"], json!("forbidden"));
}

#[when("Alice deletes the list")]
fn alice_deletes_the_list(world: &WorldFixture) {
    let path = list_path(world, "");
    record(
        world,
        Call {
            method: Method::DELETE,
            path,
            actor: Some("Alice"),
            bearer: None,
            body: None,
        },
    );
    assert_eq!(last_status(world), 204);
}

#[then("Alice can no longer fetch the list")]
fn alice_can_no_longer_fetch_the_list(world: &WorldFixture) {
    let path = list_path(world, "");
    let (status, body) = send(
        world,
        Call {
            method: Method::GET,
            path,
            actor: Some("Alice"),
            bearer: None,
            body: None,
        },
    );
    assert_eq!(status, 404);
    assert_eq!(body["code"], json!("not_found"));
}

#[when("Alice follows the share link of the list Alice owns")]
fn alice_follows_own_share_link(world: &WorldFixture) {
    let path = list_path(world, "/share");
    record(
        world,
        Call {
            method: Method::POST,
            path,
            actor: Some("Alice"),
            bearer: None,
            body: None,
        },
    );
}

#[then("the request is rejected as already owner")]
fn the_request_is_rejected_as_already_owner(world: &WorldFixture) {
    assert_eq!(last_status(world), 400);
    assert_eq!(last_body(world)["details"]["code"], json!("already_owner"));
}

#[when("a visitor follows the share link with an expired token")]
fn a_visitor_follows_the_share_link_with_an_expired_token(world: &WorldFixture) {
    let path = list_path(world, "/share");
    record(
        world,
        Call {
            method: Method::POST,
            path,
            actor: None,
            bearer: Some("expired.token.value"),
            body: None,
        },
    );
}

#[then("the join is refused with a request to sign in again")]
fn the_join_is_refused_with_a_request_to_sign_in_again(world: &WorldFixture) {
    assert_eq!(last_status(world), 401);
    assert_eq!(
        last_body(world)["message"],
        json!(SHARE_TOKEN_REJECTED)
    );
}

#[scenario(
    path = "tests/features/list_sharing.feature",
    name = "A shared user may edit items but not delete the list"
)]
fn a_shared_user_may_edit_items_but_not_delete_the_list(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/list_sharing.feature",
    name = "Joining twice leaves membership unchanged"
)]
fn joining_twice_leaves_membership_unchanged(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/list_sharing.feature",
    name = "The owner cannot join their own list"
)]
fn the_owner_cannot_join_their_own_list(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/list_sharing.feature",
    name = "A rejected token cannot join a list"
)]
fn a_rejected_token_cannot_join_a_list(world: WorldFixture) {
    drop(world);
}
