//! Driving port for list and item mutations.

use async_trait::async_trait;

use crate::domain::lists::{ListId, ShoppingList};
use crate::domain::{Error, UserId};

/// Request to create a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateListRequest {
    pub name: String,
    pub description: String,
}

/// Partial metadata update; absent or empty fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Request to append an item.
///
/// `quantity` is normalised to one when absent or not positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItemRequest {
    pub name: String,
    pub quantity: Option<i64>,
    pub details: Option<String>,
}

/// Partial item update.
///
/// `name` applies when non-empty and `quantity` when positive. `details`
/// applies whenever present, and an empty string clears it. `checked` is
/// written in the same store call as the other fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub details: Option<String>,
    pub checked: Option<bool>,
}

/// Driving port for list write operations.
///
/// Every operation authorises `actor` against the list before mutating it
/// and returns the aggregate as stored after the change.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListCommand: Send + Sync {
    /// Create an empty list owned by `actor`.
    async fn create_list(
        &self,
        actor: UserId,
        request: CreateListRequest,
    ) -> Result<ShoppingList, Error>;

    /// Rename or re-describe a list. Shared users are allowed.
    async fn update_list_metadata(
        &self,
        list_id: ListId,
        actor: UserId,
        request: UpdateListRequest,
    ) -> Result<ShoppingList, Error>;

    /// Delete a list. Owner only.
    async fn delete_list(&self, list_id: ListId, actor: UserId) -> Result<(), Error>;

    /// Append an item at the tail.
    async fn add_item(
        &self,
        list_id: ListId,
        actor: UserId,
        request: AddItemRequest,
    ) -> Result<ShoppingList, Error>;

    /// Set the checked flag of the item at `index`.
    async fn set_item_checked(
        &self,
        list_id: ListId,
        actor: UserId,
        index: i64,
        checked: bool,
    ) -> Result<ShoppingList, Error>;

    /// Update fields of the item at `index`.
    async fn update_item(
        &self,
        list_id: ListId,
        actor: UserId,
        index: i64,
        request: UpdateItemRequest,
    ) -> Result<ShoppingList, Error>;

    /// Remove the item at `index`; later items shift down by one.
    async fn delete_item(
        &self,
        list_id: ListId,
        actor: UserId,
        index: i64,
    ) -> Result<ShoppingList, Error>;

    /// Join a list by link. Idempotent for members; owners are rejected.
    async fn share_list(&self, list_id: ListId, actor: UserId) -> Result<ShoppingList, Error>;
}
