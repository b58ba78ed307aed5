//! Tests for the list aggregate and its value types.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(seconds, 0).expect("valid timestamp")
}

#[fixture]
fn owner() -> UserId {
    UserId::random()
}

#[fixture]
fn list() -> ShoppingList {
    ShoppingList::create(UserId::random(), "  Groceries ", "Weekly", at(100))
        .expect("valid list")
}

fn item(name: &str, added_by: UserId) -> ListItem {
    ListItem {
        name: name.to_owned(),
        quantity: Quantity::ONE,
        details: None,
        checked: false,
        added_by,
        added_at: at(100),
    }
}

#[rstest]
fn create_keeps_the_owner(owner: UserId) {
    let list = ShoppingList::create(owner, "Groceries", "", at(0)).expect("valid list");
    assert_eq!(list.owner_id(), owner);
}

#[rstest]
fn create_starts_empty_at_revision_one(list: ShoppingList) {
    assert_eq!(list.name(), "Groceries");
    assert!(list.items().is_empty());
    assert!(list.shared_with().is_empty());
    assert_eq!(list.created_at(), list.updated_at());
    assert_eq!(list.revision(), 1);
}

#[rstest]
fn create_rejects_blank_names(owner: UserId) {
    let err = ShoppingList::create(owner, "   ", "", at(0)).expect_err("blank name");
    assert_eq!(err, ListValidationError::EmptyName);
}

#[rstest]
#[case(None, 1)]
#[case(Some(0), 1)]
#[case(Some(-5), 1)]
#[case(Some(3), 3)]
#[case(Some(i64::MAX), u32::MAX)]
fn quantity_normalisation(#[case] raw: Option<i64>, #[case] expected: u32) {
    assert_eq!(Quantity::normalised(raw).get(), expected);
}

#[rstest]
fn quantity_rejects_zero_on_deserialise() {
    assert!(serde_json::from_value::<Quantity>(json!(0)).is_err());
}

#[rstest]
fn details_boundary() {
    assert!(ItemDetails::new("x".repeat(ITEM_DETAILS_MAX)).is_ok());
    assert_eq!(
        ItemDetails::new("x".repeat(ITEM_DETAILS_MAX + 1)).expect_err("too long"),
        ListValidationError::DetailsTooLong {
            max: ITEM_DETAILS_MAX
        }
    );
    assert_eq!(ItemDetails::optional("").expect("empty allowed"), None);
}

#[rstest]
fn details_limit_counts_characters_not_bytes() {
    assert!(ItemDetails::new("é".repeat(ITEM_DETAILS_MAX)).is_ok());
}

#[rstest]
#[case(0, 3, Some(0))]
#[case(2, 3, Some(2))]
#[case(3, 3, None)]
#[case(-1, 3, None)]
#[case(0, 0, None)]
fn index_resolution(#[case] index: i64, #[case] len: usize, #[case] expected: Option<usize>) {
    assert_eq!(resolve_index(index, len), expected);
}

#[rstest]
fn timestamps_advance_even_with_a_frozen_clock() {
    let previous = at(100);
    assert_eq!(advance_timestamp(previous, at(200)), at(200));
    assert_eq!(
        advance_timestamp(previous, previous),
        previous + Duration::microseconds(1)
    );
    assert_eq!(
        advance_timestamp(previous, at(50)),
        previous + Duration::microseconds(1)
    );
}

#[rstest]
fn add_shared_user_is_a_set_union(mut list: ShoppingList) {
    let owner = list.owner_id();
    let member = UserId::random();

    assert!(list.add_shared_user(member, at(200)));
    let after_first = (list.updated_at(), list.revision());

    assert!(!list.add_shared_user(member, at(300)));
    assert!(!list.add_shared_user(owner, at(300)));
    assert!(!list.shared_with().contains(&owner));
    assert_eq!(list.shared_with(), &[member]);
    assert_eq!((list.updated_at(), list.revision()), after_first);
}

#[rstest]
fn mutations_bump_revision_and_timestamp(mut list: ShoppingList) {
    let owner = list.owner_id();
    list.push_item(item("Milk", owner), at(100));
    assert_eq!(list.revision(), 2);
    assert!(list.updated_at() > at(100));

    list.apply_metadata(
        &MetadataUpdate {
            name: Some("Party".to_owned()),
            description: None,
        },
        at(400),
    );
    assert_eq!(list.name(), "Party");
    assert_eq!(list.description(), "Weekly");
    assert_eq!(list.updated_at(), at(400));
    assert_eq!(list.revision(), 3);
}

#[rstest]
fn serialises_camel_case(mut list: ShoppingList) {
    let owner = list.owner_id();
    list.push_item(item("Milk", owner), at(200));
    let value = serde_json::to_value(&list).expect("serialise list");

    assert_eq!(value["ownerId"], json!(owner.to_string()));
    assert_eq!(value["items"][0]["quantity"], json!(1));
    assert_eq!(value["items"][0]["addedBy"], json!(owner.to_string()));
    assert!(value["items"][0].get("details").is_none());
    assert_eq!(value["sharedWith"], json!([]));
}

#[rstest]
fn item_round_trips_through_json(owner: UserId) {
    let mut original = item("Flour", owner);
    original.details = ItemDetails::optional("1kg").expect("short details");

    let value = serde_json::to_value(&original).expect("serialise item");
    let restored: ListItem = serde_json::from_value(value).expect("deserialise item");

    assert_eq!(restored, original);
}
