//! Shopping list aggregate.
//!
//! A [`ShoppingList`] owns an ordered sequence of [`ListItem`]s addressed by
//! position. Items carry no durable identifier, so an index is only stable
//! until the next delete; the aggregate `revision` lets the store reject
//! positional writes based on a stale read.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserId;

pub mod access;
pub mod service;

pub use access::{AccessLevel, access_level};
pub use service::ListService;

/// Maximum length, in characters, of an item's details field.
pub const ITEM_DETAILS_MAX: usize = 512;

/// Validation failures for list and item fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListValidationError {
    #[error("list id must be a valid UUID")]
    InvalidId,
    #[error("name is required")]
    EmptyName,
    #[error("details must be at most {max} characters")]
    DetailsTooLong { max: usize },
    #[error("quantity must be a positive integer")]
    NonPositiveQuantity,
}

/// Stable list identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListId(Uuid);

impl ListId {
    /// Parse a list identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ListValidationError> {
        let id = id.as_ref();
        if id.trim() != id {
            return Err(ListValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| ListValidationError::InvalidId)
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ListId> for String {
    fn from(value: ListId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for ListId {
    type Error = ListValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Positive item quantity.
///
/// # Examples
/// ```
/// use grocer::domain::lists::Quantity;
///
/// assert_eq!(Quantity::normalised(None).get(), 1);
/// assert_eq!(Quantity::normalised(Some(-5)).get(), 1);
/// assert_eq!(Quantity::normalised(Some(3)).get(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Self = Self(1);

    /// Quantity used when adding an item: absent or non-positive inputs
    /// become one, values above `u32::MAX` saturate.
    pub fn normalised(raw: Option<i64>) -> Self {
        raw.and_then(Self::positive).unwrap_or(Self::ONE)
    }

    /// Quantity when `raw` is strictly positive.
    pub fn positive(raw: i64) -> Option<Self> {
        if raw <= 0 {
            return None;
        }
        Some(Self(u32::try_from(raw).unwrap_or(u32::MAX)))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = ListValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(ListValidationError::NonPositiveQuantity);
        }
        Ok(Self(value))
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

/// Free-text details or unit for an item, bounded by [`ITEM_DETAILS_MAX`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemDetails(String);

impl ItemDetails {
    pub fn new(raw: impl Into<String>) -> Result<Self, ListValidationError> {
        let raw = raw.into();
        if raw.chars().count() > ITEM_DETAILS_MAX {
            return Err(ListValidationError::DetailsTooLong {
                max: ITEM_DETAILS_MAX,
            });
        }
        Ok(Self(raw))
    }

    /// Validate `raw`, mapping an empty string to "no details".
    pub fn optional(raw: impl Into<String>) -> Result<Option<Self>, ListValidationError> {
        let details = Self::new(raw)?;
        Ok((!details.0.is_empty()).then_some(details))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemDetails {
    type Error = ListValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemDetails> for String {
    fn from(value: ItemDetails) -> Self {
        value.0
    }
}

/// Line item owned by a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    #[schema(example = "Milk")]
    pub name: String,
    #[schema(value_type = u32, minimum = 1, example = 2)]
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, max_length = 512, example = "semi-skimmed")]
    pub details: Option<ItemDetails>,
    pub checked: bool,
    #[schema(value_type = String)]
    pub added_by: UserId,
    pub added_at: DateTime<Utc>,
}

/// Components needed to rebuild a list loaded from storage.
#[derive(Debug, Clone)]
pub struct ShoppingListDraft {
    pub id: ListId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub items: Vec<ListItem>,
    pub shared_with: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u64,
}

/// List aggregate root.
///
/// ## Invariants
/// - `owner_id` never changes after creation.
/// - `shared_with` holds no duplicates and never contains `owner_id`.
/// - `updated_at` strictly advances on every persisted mutation.
/// - `revision` starts at 1 and increments on every persisted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    #[schema(value_type = String, example = "0b7f8d6e-2f0c-4a8e-9c1d-5e6f7a8b9c0d")]
    id: ListId,
    #[schema(value_type = String)]
    owner_id: UserId,
    #[schema(example = "Groceries")]
    name: String,
    #[schema(example = "Weekly shop")]
    description: String,
    items: Vec<ListItem>,
    #[schema(value_type = Vec<String>)]
    shared_with: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u64,
}

impl ShoppingList {
    /// Start a new, empty list owned by `owner_id`.
    pub fn create(
        owner_id: UserId,
        name: impl AsRef<str>,
        description: impl AsRef<str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ListValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ListValidationError::EmptyName);
        }
        Ok(Self {
            id: ListId::random(),
            owner_id,
            name: name.to_owned(),
            description: description.as_ref().trim().to_owned(),
            items: Vec::new(),
            shared_with: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 1,
        })
    }

    /// Rebuild a list from stored components, restoring the shared-set
    /// invariants if the store returned duplicates or the owner.
    pub fn restore(draft: ShoppingListDraft) -> Self {
        let ShoppingListDraft {
            id,
            owner_id,
            name,
            description,
            items,
            shared_with,
            created_at,
            updated_at,
            revision,
        } = draft;
        let mut members: Vec<UserId> = Vec::with_capacity(shared_with.len());
        for user in shared_with {
            if user != owner_id && !members.contains(&user) {
                members.push(user);
            }
        }
        Self {
            id,
            owner_id,
            name,
            description,
            items,
            shared_with: members,
            created_at,
            updated_at,
            revision,
        }
    }

    pub fn id(&self) -> ListId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn shared_with(&self) -> &[UserId] {
        &self.shared_with
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Access level `user` holds on this list.
    pub fn access_for(&self, user: &UserId) -> AccessLevel {
        access_level(self, user)
    }

    /// Record a mutation: advance `updated_at` and the revision.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = advance_timestamp(self.updated_at, now);
        self.revision += 1;
    }

    /// Apply already-filtered metadata changes.
    pub fn apply_metadata(&mut self, update: &MetadataUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(description) = &update.description {
            self.description.clone_from(description);
        }
        self.touch(now);
    }

    /// Append `item` at the tail.
    pub fn push_item(&mut self, item: ListItem, now: DateTime<Utc>) {
        self.items.push(item);
        self.touch(now);
    }

    /// Add `user` to the shared set. Returns `false` when membership is
    /// unchanged, in which case nothing is touched.
    pub fn add_shared_user(&mut self, user: UserId, now: DateTime<Utc>) -> bool {
        if user == self.owner_id || self.shared_with.contains(&user) {
            return false;
        }
        self.shared_with.push(user);
        self.touch(now);
        true
    }

    /// Replace the whole item sequence.
    pub fn replace_items(&mut self, items: Vec<ListItem>, now: DateTime<Utc>) {
        self.items = items;
        self.touch(now);
    }
}

/// Next `updated_at` value: `now`, or one microsecond past `previous` when
/// the clock has not moved beyond it.
///
/// Microsecond granularity matches the PostgreSQL `timestamptz` resolution.
pub fn advance_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now >= floor { now } else { floor }
}

/// Metadata fields to overwrite; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Resolve a caller-supplied index against a sequence of `len` items.
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|position| *position < len)
}

#[cfg(test)]
mod tests;
