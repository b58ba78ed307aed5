//! Port abstraction for list persistence adapters and their errors.
//!
//! Append and share are additive operations the store applies atomically, so
//! concurrent callers never lose each other's writes. Index-addressed item
//! mutations go through [`ListRepository::replace_items`], an explicit
//! read-modify-write boundary guarded by the aggregate revision.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;
use crate::domain::lists::{ListId, ListItem, MetadataUpdate, ShoppingList};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by list repository adapters.
    pub enum ListRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "list repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "list repository query failed: {message}",
        /// The list was modified after the caller read it.
        RevisionMismatch { expected: u64, actual: u64 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The list does not exist (or was deleted mid-operation).
        Missing { list_id: ListId } => "list {list_id} does not exist",
    }
}

/// Port for list aggregate storage.
///
/// # Mutation semantics
///
/// Every successful mutation increments the stored revision by one and sets
/// `updated_at` to `max(now, updated_at + 1µs)` so the timestamp strictly
/// advances even when callers race or the clock stalls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Persist a freshly created list.
    async fn insert(&self, list: &ShoppingList) -> Result<(), ListRepositoryError>;

    /// Fetch a list by identifier.
    async fn find_by_id(&self, id: &ListId) -> Result<Option<ShoppingList>, ListRepositoryError>;

    /// Lists owned by or shared with `user`, newest first. Lists created at
    /// the same instant keep their insertion order.
    async fn list_visible_to(&self, user: &UserId)
    -> Result<Vec<ShoppingList>, ListRepositoryError>;

    /// Overwrite the supplied metadata fields.
    async fn update_metadata(
        &self,
        id: &ListId,
        update: &MetadataUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError>;

    /// Atomically append `item` to the tail of the sequence.
    async fn push_item(
        &self,
        id: &ListId,
        item: &ListItem,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError>;

    /// Atomically add `user` to the shared set.
    ///
    /// Returns `false`, without touching the list, when `user` is already a
    /// member or is the owner.
    async fn add_shared_user(
        &self,
        id: &ListId,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, ListRepositoryError>;

    /// Replace the whole item sequence if the stored revision still equals
    /// `expected_revision`; otherwise fail with
    /// [`ListRepositoryError::RevisionMismatch`].
    async fn replace_items(
        &self,
        id: &ListId,
        items: &[ListItem],
        expected_revision: u64,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError>;

    /// Remove the list. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &ListId) -> Result<bool, ListRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_error_names_the_list() {
        let id = ListId::random();
        let err = ListRepositoryError::missing(id);
        assert_eq!(err.to_string(), format!("list {id} does not exist"));
    }

    #[test]
    fn revision_mismatch_reports_both_revisions() {
        let err = ListRepositoryError::revision_mismatch(3_u64, 5_u64);
        assert_eq!(err.to_string(), "revision mismatch: expected 3, found 5");
    }
}
