//! Driving port for list reads.

use async_trait::async_trait;

use crate::domain::lists::{ListId, ShoppingList};
use crate::domain::{Error, UserId};

/// Driving port for list read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListQuery: Send + Sync {
    /// Lists `actor` owns or has joined, newest first.
    async fn lists_visible_to(&self, actor: UserId) -> Result<Vec<ShoppingList>, Error>;

    /// Fetch one list.
    ///
    /// Fails with `not_found` when the list does not exist and `forbidden`
    /// when it exists but `actor` has no access; existence is not secret.
    async fn get_list(&self, list_id: ListId, actor: UserId) -> Result<ShoppingList, Error>;
}
