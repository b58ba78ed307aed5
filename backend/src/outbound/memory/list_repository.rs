//! `RwLock<HashMap>`-backed list repository.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;
use crate::domain::lists::{AccessLevel, ListId, ListItem, MetadataUpdate, ShoppingList};
use crate::domain::ports::{ListRepository, ListRepositoryError};

#[derive(Debug, Default)]
struct State {
    next_seq: u64,
    lists: HashMap<ListId, Stored>,
}

#[derive(Debug)]
struct Stored {
    seq: u64,
    list: ShoppingList,
}

/// In-memory list repository.
///
/// Every mutation runs under the write lock, which makes append, share, and
/// the revision check in `replace_items` atomic.
#[derive(Debug, Default)]
pub struct InMemoryListRepository {
    state: RwLock<State>,
}

impl InMemoryListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, ListRepositoryError> {
        self.state
            .read()
            .map_err(|_| ListRepositoryError::query("in-memory list store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, ListRepositoryError> {
        self.state
            .write()
            .map_err(|_| ListRepositoryError::query("in-memory list store lock poisoned"))
    }

    fn mutate<T>(
        &self,
        id: &ListId,
        apply: impl FnOnce(&mut ShoppingList) -> Result<T, ListRepositoryError>,
    ) -> Result<T, ListRepositoryError> {
        let mut state = self.write()?;
        let stored = state
            .lists
            .get_mut(id)
            .ok_or_else(|| ListRepositoryError::missing(*id))?;
        apply(&mut stored.list)
    }
}

#[async_trait]
impl ListRepository for InMemoryListRepository {
    async fn insert(&self, list: &ShoppingList) -> Result<(), ListRepositoryError> {
        let mut state = self.write()?;
        if state.lists.contains_key(&list.id()) {
            return Err(ListRepositoryError::query(format!(
                "list {} already exists",
                list.id()
            )));
        }
        state.next_seq += 1;
        let seq = state.next_seq;
        state.lists.insert(
            list.id(),
            Stored {
                seq,
                list: list.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &ListId) -> Result<Option<ShoppingList>, ListRepositoryError> {
        Ok(self.read()?.lists.get(id).map(|stored| stored.list.clone()))
    }

    async fn list_visible_to(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShoppingList>, ListRepositoryError> {
        let state = self.read()?;
        let mut visible: Vec<&Stored> = state
            .lists
            .values()
            .filter(|stored| stored.list.access_for(user) != AccessLevel::None)
            .collect();
        visible.sort_by(|a, b| {
            b.list
                .created_at()
                .cmp(&a.list.created_at())
                .then(a.seq.cmp(&b.seq))
        });
        Ok(visible.into_iter().map(|stored| stored.list.clone()).collect())
    }

    async fn update_metadata(
        &self,
        id: &ListId,
        update: &MetadataUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError> {
        self.mutate(id, |list| {
            list.apply_metadata(update, now);
            Ok(())
        })
    }

    async fn push_item(
        &self,
        id: &ListId,
        item: &ListItem,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError> {
        self.mutate(id, |list| {
            list.push_item(item.clone(), now);
            Ok(())
        })
    }

    async fn add_shared_user(
        &self,
        id: &ListId,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, ListRepositoryError> {
        self.mutate(id, |list| Ok(list.add_shared_user(*user, now)))
    }

    async fn replace_items(
        &self,
        id: &ListId,
        items: &[ListItem],
        expected_revision: u64,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError> {
        self.mutate(id, |list| {
            if list.revision() != expected_revision {
                return Err(ListRepositoryError::revision_mismatch(
                    expected_revision,
                    list.revision(),
                ));
            }
            list.replace_items(items.to_vec(), now);
            Ok(())
        })
    }

    async fn delete(&self, id: &ListId) -> Result<bool, ListRepositoryError> {
        Ok(self.write()?.lists.remove(id).is_some())
    }
}
