//! List domain service.
//!
//! Implements the list driving ports on top of a [`ListRepository`]. Every
//! operation loads the aggregate, consults [`access_level`], then applies the
//! change through the narrowest store primitive: atomic append for new items,
//! atomic set-union for sharing, and a revision-guarded sequence replace for
//! positional item edits.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::lists::{
    AccessLevel, ItemDetails, ListId, ListItem, ListValidationError, MetadataUpdate, Quantity,
    ShoppingList, access_level, resolve_index,
};
use crate::domain::ports::{
    AddItemRequest, CreateListRequest, ListCommand, ListQuery, ListRepository,
    ListRepositoryError, UpdateItemRequest, UpdateListRequest,
};
use crate::domain::{Error, UserId};

/// Upper bound on a single store call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures raised by list operations before they reach an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("list {0} not found")]
    NotFound(ListId),
    #[error("you do not have access to this list")]
    Forbidden,
    #[error("only the list owner can delete it")]
    OwnerOnly,
    #[error("invalid item index {index} for a list of {len} items")]
    InvalidIndex { index: i64, len: usize },
    #[error(transparent)]
    Validation(#[from] ListValidationError),
    #[error("you are already the owner of this list")]
    AlreadyOwner,
    #[error("list store timed out during {operation}")]
    StoreTimeout { operation: &'static str },
    #[error(transparent)]
    Store(#[from] ListRepositoryError),
}

impl From<ListError> for Error {
    fn from(value: ListError) -> Self {
        match value {
            ListError::NotFound(_) => Error::not_found(value.to_string()),
            ListError::Forbidden | ListError::OwnerOnly => Error::forbidden(value.to_string()),
            ListError::InvalidIndex { index, len } => Error::invalid_request("invalid item index")
                .with_details(json!({
                    "code": "invalid_index",
                    "index": index,
                    "length": len,
                })),
            ListError::Validation(err) => Error::invalid_request(err.to_string()),
            ListError::AlreadyOwner => Error::invalid_request(value.to_string())
                .with_details(json!({ "code": "already_owner" })),
            ListError::StoreTimeout { .. } => Error::service_unavailable(value.to_string()),
            ListError::Store(err) => map_repository_error(err),
        }
    }
}

fn map_repository_error(error: ListRepositoryError) -> Error {
    match error {
        ListRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("list repository unavailable: {message}"))
        }
        ListRepositoryError::Query { message } => {
            Error::internal(format!("list repository error: {message}"))
        }
        ListRepositoryError::RevisionMismatch { expected, actual } => {
            Error::conflict("list was modified concurrently; reload and retry").with_details(
                json!({
                    "expectedRevision": expected,
                    "actualRevision": actual,
                    "code": "revision_mismatch",
                }),
            )
        }
        ListRepositoryError::Missing { list_id } => {
            Error::not_found(format!("list {list_id} not found"))
        }
    }
}

/// What an operation needs from the caller's [`AccessLevel`].
#[derive(Debug, Clone, Copy)]
enum Requirement {
    ReadWrite,
    Owner,
}

impl Requirement {
    fn check(self, level: AccessLevel) -> Result<(), ListError> {
        match self {
            Self::ReadWrite if level.can_write() => Ok(()),
            Self::Owner if level.can_delete() => Ok(()),
            Self::ReadWrite => Err(ListError::Forbidden),
            Self::Owner if level.can_read() => Err(ListError::OwnerOnly),
            Self::Owner => Err(ListError::Forbidden),
        }
    }
}

/// List service implementing [`ListCommand`] and [`ListQuery`].
///
/// # Examples
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use mockable::DefaultClock;
/// # use grocer::domain::lists::ListService;
/// # use grocer::domain::ports::ListRepository;
/// # fn build(repo: Arc<dyn ListRepository>) {
/// let service = ListService::new(repo, Arc::new(DefaultClock))
///     .with_store_timeout(std::time::Duration::from_secs(5));
/// # let _ = service;
/// # }
/// ```
pub struct ListService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl<R: ?Sized> Clone for ListService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            clock: Arc::clone(&self.clock),
            store_timeout: self.store_timeout,
        }
    }
}

impl<R: ?Sized> ListService<R> {
    /// Create a service over `repo` using [`DEFAULT_STORE_TIMEOUT`].
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the per-call store timeout.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }
}

impl<R> ListService<R>
where
    R: ListRepository + ?Sized,
{
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, ListError>
    where
        F: Future<Output = Result<T, ListRepositoryError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(ListError::from),
            Err(_) => {
                warn!(operation, timeout_ms = ?self.store_timeout.as_millis(), "list store timed out");
                Err(ListError::StoreTimeout { operation })
            }
        }
    }

    async fn load(&self, list_id: ListId) -> Result<ShoppingList, ListError> {
        self.bounded("find_by_id", self.repo.find_by_id(&list_id))
            .await?
            .ok_or(ListError::NotFound(list_id))
    }

    async fn load_authorised(
        &self,
        list_id: ListId,
        actor: UserId,
        requirement: Requirement,
    ) -> Result<ShoppingList, ListError> {
        let list = self.load(list_id).await?;
        requirement.check(access_level(&list, &actor))?;
        Ok(list)
    }

    /// Rewrite the item sequence at a caller-supplied position.
    async fn mutate_item<F>(
        &self,
        list_id: ListId,
        actor: UserId,
        index: i64,
        edit: F,
    ) -> Result<ShoppingList, ListError>
    where
        F: FnOnce(&mut Vec<ListItem>, usize) -> Result<(), ListError> + Send,
    {
        let list = self
            .load_authorised(list_id, actor, Requirement::ReadWrite)
            .await?;
        let len = list.items().len();
        let position = resolve_index(index, len).ok_or(ListError::InvalidIndex { index, len })?;

        let mut items = list.items().to_vec();
        edit(&mut items, position)?;

        let now = self.clock.utc();
        self.bounded(
            "replace_items",
            self.repo
                .replace_items(&list_id, &items, list.revision(), now),
        )
        .await
        .inspect_err(|err| {
            if matches!(err, ListError::Store(ListRepositoryError::RevisionMismatch { .. })) {
                warn!(list_id = %list_id, actor = %actor, "rejected stale item write");
            }
        })?;
        self.load(list_id).await
    }

    async fn create(
        &self,
        actor: UserId,
        request: CreateListRequest,
    ) -> Result<ShoppingList, ListError> {
        let list = ShoppingList::create(actor, &request.name, &request.description, self.clock.utc())?;
        self.bounded("insert", self.repo.insert(&list)).await?;
        debug!(list_id = %list.id(), owner = %actor, "list created");
        Ok(list)
    }

    async fn update_metadata(
        &self,
        list_id: ListId,
        actor: UserId,
        request: UpdateListRequest,
    ) -> Result<ShoppingList, ListError> {
        self.load_authorised(list_id, actor, Requirement::ReadWrite)
            .await?;
        let update = MetadataUpdate {
            name: supplied(request.name),
            description: supplied(request.description),
        };
        let now = self.clock.utc();
        self.bounded(
            "update_metadata",
            self.repo.update_metadata(&list_id, &update, now),
        )
        .await?;
        self.load(list_id).await
    }

    async fn delete(&self, list_id: ListId, actor: UserId) -> Result<(), ListError> {
        self.load_authorised(list_id, actor, Requirement::Owner)
            .await?;
        if !self.bounded("delete", self.repo.delete(&list_id)).await? {
            return Err(ListError::NotFound(list_id));
        }
        info!(list_id = %list_id, owner = %actor, "list deleted");
        Ok(())
    }

    async fn add(
        &self,
        list_id: ListId,
        actor: UserId,
        request: AddItemRequest,
    ) -> Result<ShoppingList, ListError> {
        self.load_authorised(list_id, actor, Requirement::ReadWrite)
            .await?;
        let name = request.name;
        if name.trim().is_empty() {
            return Err(ListValidationError::EmptyName.into());
        }
        let details = request
            .details
            .map(ItemDetails::optional)
            .transpose()?
            .flatten();
        let now = self.clock.utc();
        let item = ListItem {
            name,
            quantity: Quantity::normalised(request.quantity),
            details,
            checked: false,
            added_by: actor,
            added_at: now,
        };
        self.bounded("push_item", self.repo.push_item(&list_id, &item, now))
            .await?;
        self.load(list_id).await
    }

    async fn share(&self, list_id: ListId, actor: UserId) -> Result<ShoppingList, ListError> {
        let list = self.load(list_id).await?;
        match access_level(&list, &actor) {
            AccessLevel::Owner => return Err(ListError::AlreadyOwner),
            AccessLevel::Shared => return Ok(list),
            AccessLevel::None => {}
        }

        let now = self.clock.utc();
        let joined = self
            .bounded(
                "add_shared_user",
                self.repo.add_shared_user(&list_id, &actor, now),
            )
            .await?;
        if joined {
            info!(list_id = %list_id, user = %actor, "user joined shared list");
        }
        self.load(list_id).await
    }
}

/// Supplied text fields replace stored ones unless they are the empty string.
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.is_empty())
}

#[async_trait]
impl<R> ListQuery for ListService<R>
where
    R: ListRepository + ?Sized,
{
    async fn lists_visible_to(&self, actor: UserId) -> Result<Vec<ShoppingList>, Error> {
        Ok(self
            .bounded("list_visible_to", self.repo.list_visible_to(&actor))
            .await?)
    }

    async fn get_list(&self, list_id: ListId, actor: UserId) -> Result<ShoppingList, Error> {
        Ok(self
            .load_authorised(list_id, actor, Requirement::ReadWrite)
            .await?)
    }
}

#[async_trait]
impl<R> ListCommand for ListService<R>
where
    R: ListRepository + ?Sized,
{
    async fn create_list(
        &self,
        actor: UserId,
        request: CreateListRequest,
    ) -> Result<ShoppingList, Error> {
        Ok(self.create(actor, request).await?)
    }

    async fn update_list_metadata(
        &self,
        list_id: ListId,
        actor: UserId,
        request: UpdateListRequest,
    ) -> Result<ShoppingList, Error> {
        Ok(self.update_metadata(list_id, actor, request).await?)
    }

    async fn delete_list(&self, list_id: ListId, actor: UserId) -> Result<(), Error> {
        Ok(self.delete(list_id, actor).await?)
    }

    async fn add_item(
        &self,
        list_id: ListId,
        actor: UserId,
        request: AddItemRequest,
    ) -> Result<ShoppingList, Error> {
        Ok(self.add(list_id, actor, request).await?)
    }

    async fn set_item_checked(
        &self,
        list_id: ListId,
        actor: UserId,
        index: i64,
        checked: bool,
    ) -> Result<ShoppingList, Error> {
        Ok(self
            .mutate_item(list_id, actor, index, move |items, position| {
                if let Some(item) = items.get_mut(position) {
                    item.checked = checked;
                }
                Ok(())
            })
            .await?)
    }

    async fn update_item(
        &self,
        list_id: ListId,
        actor: UserId,
        index: i64,
        request: UpdateItemRequest,
    ) -> Result<ShoppingList, Error> {
        Ok(self
            .mutate_item(list_id, actor, index, move |items, position| {
                let details = request.details.map(ItemDetails::optional).transpose()?;
                let Some(item) = items.get_mut(position) else {
                    return Ok(());
                };
                if let Some(name) = supplied(request.name) {
                    item.name = name;
                }
                if let Some(quantity) = request.quantity.and_then(Quantity::positive) {
                    item.quantity = quantity;
                }
                if let Some(details) = details {
                    item.details = details;
                }
                if let Some(checked) = request.checked {
                    item.checked = checked;
                }
                Ok(())
            })
            .await?)
    }

    async fn delete_item(
        &self,
        list_id: ListId,
        actor: UserId,
        index: i64,
    ) -> Result<ShoppingList, Error> {
        Ok(self
            .mutate_item(list_id, actor, index, |items, position| {
                items.remove(position);
                Ok(())
            })
            .await?)
    }

    async fn share_list(&self, list_id: ListId, actor: UserId) -> Result<ShoppingList, Error> {
        Ok(self.share(list_id, actor).await?)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
