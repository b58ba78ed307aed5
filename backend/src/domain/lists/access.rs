//! Access-control policy for shopping lists.
//!
//! [`access_level`] is total and side-effect free; every list operation
//! consults it before reading or mutating an aggregate.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::UserId;

use super::ShoppingList;

/// Relationship between a user and a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Created the list; may delete it.
    Owner,
    /// Joined through sharing; may read and mutate but not delete.
    Shared,
    /// No relationship.
    None,
}

impl AccessLevel {
    /// Whether the level grants reads and item or metadata mutations.
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Owner | Self::Shared)
    }

    /// Reads require the same level as writes.
    pub const fn can_read(self) -> bool {
        self.can_write()
    }

    /// Only owners may delete a list.
    pub const fn can_delete(self) -> bool {
        matches!(self, Self::Owner)
    }
}

/// Decide the access level `user` holds on `list`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use grocer::domain::UserId;
/// use grocer::domain::lists::{AccessLevel, ShoppingList, access_level};
///
/// let owner = UserId::random();
/// let list = ShoppingList::create(owner, "Groceries", "", Utc::now()).unwrap();
/// assert_eq!(access_level(&list, &owner), AccessLevel::Owner);
/// assert_eq!(access_level(&list, &UserId::random()), AccessLevel::None);
/// ```
pub fn access_level(list: &ShoppingList, user: &UserId) -> AccessLevel {
    if list.owner_id() == *user {
        AccessLevel::Owner
    } else if list.shared_with().contains(user) {
        AccessLevel::Shared
    } else {
        AccessLevel::None
    }
}
