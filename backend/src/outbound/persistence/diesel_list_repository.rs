//! PostgreSQL-backed `ListRepository`.
//!
//! Items live in a `jsonb` array and the shared set in a `uuid[]` column so
//! append and share run as single `UPDATE` statements. Whole-sequence writes
//! are guarded by `revision` and re-read on a miss to tell a stale revision
//! apart from a deleted list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Jsonb, Nullable, Text, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::lists::{ListId, ListItem, MetadataUpdate, ShoppingList, ShoppingListDraft};
use crate::domain::ports::{ListRepository, ListRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ListRow, NewListRow};
use super::pool::{DbPool, PoolError};
use super::schema::lists;

/// Diesel implementation of the list store.
#[derive(Clone)]
pub struct DieselListRepository {
    pool: DbPool,
}

impl DieselListRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const UPDATED_AT: &str = "GREATEST($2, updated_at + interval '1 microsecond')";

fn update_sql(assignments: &str, guard: &str) -> String {
    format!(
        "UPDATE lists SET {assignments}, revision = revision + 1, updated_at = {UPDATED_AT} \
         WHERE id = $1{guard}"
    )
}

fn pool_error(error: PoolError) -> ListRepositoryError {
    map_pool_error(error, ListRepositoryError::connection)
}

fn diesel_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> ListRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            ListRepositoryError::query,
            ListRepositoryError::connection,
        )
    }
}

fn items_to_json(items: &[ListItem]) -> Result<serde_json::Value, ListRepositoryError> {
    serde_json::to_value(items)
        .map_err(|err| ListRepositoryError::query(format!("failed to encode items: {err}")))
}

fn item_to_json(item: &ListItem) -> Result<serde_json::Value, ListRepositoryError> {
    serde_json::to_value(item)
        .map_err(|err| ListRepositoryError::query(format!("failed to encode item: {err}")))
}

fn revision_to_db(revision: u64) -> Result<i64, ListRepositoryError> {
    i64::try_from(revision)
        .map_err(|_| ListRepositoryError::query(format!("revision {revision} out of range")))
}

fn revision_from_db(revision: i64) -> Result<u64, ListRepositoryError> {
    u64::try_from(revision)
        .map_err(|_| ListRepositoryError::query(format!("stored revision {revision} is negative")))
}

pub(super) fn row_to_list(row: ListRow) -> Result<ShoppingList, ListRepositoryError> {
    let items: Vec<ListItem> = serde_json::from_value(row.items).map_err(|err| {
        ListRepositoryError::query(format!("list {} has malformed items: {err}", row.id))
    })?;
    Ok(ShoppingList::restore(ShoppingListDraft {
        id: ListId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        name: row.name,
        description: row.description,
        items,
        shared_with: row.shared_with.into_iter().map(UserId::from_uuid).collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
        revision: revision_from_db(row.revision)?,
    }))
}

impl DieselListRepository {
    /// Current revision of `id`, or `None` when the list is gone.
    async fn current_revision(&self, id: &ListId) -> Result<Option<u64>, ListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let revision: Option<i64> = lists::table
            .find(id.as_uuid())
            .select(lists::revision)
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("read list revision"))?;
        revision.map(revision_from_db).transpose()
    }
}

#[async_trait]
impl ListRepository for DieselListRepository {
    async fn insert(&self, list: &ShoppingList) -> Result<(), ListRepositoryError> {
        let row = NewListRow {
            id: *list.id().as_uuid(),
            owner_id: *list.owner_id().as_uuid(),
            name: list.name(),
            description: list.description(),
            items: items_to_json(list.items())?,
            shared_with: list.shared_with().iter().map(|user| *user.as_uuid()).collect(),
            created_at: list.created_at(),
            updated_at: list.updated_at(),
            revision: revision_to_db(list.revision())?,
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(lists::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error("insert list"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ListId) -> Result<Option<ShoppingList>, ListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ListRow> = lists::table
            .find(id.as_uuid())
            .select(ListRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find list"))?;
        row.map(row_to_list).transpose()
    }

    async fn list_visible_to(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShoppingList>, ListRepositoryError> {
        let user = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ListRow> = lists::table
            .filter(
                lists::owner_id
                    .eq(user)
                    .or(lists::shared_with.contains(vec![user])),
            )
            .order((lists::created_at.desc(), lists::seq.asc()))
            .select(ListRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error("list visible lists"))?;
        rows.into_iter().map(row_to_list).collect()
    }

    async fn update_metadata(
        &self,
        id: &ListId,
        update: &MetadataUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError> {
        let sql = update_sql(
            "name = COALESCE($3, name), description = COALESCE($4, description)",
            "",
        );
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected = sql_query(sql)
            .bind::<SqlUuid, _>(id.as_uuid())
            .bind::<Timestamptz, _>(now)
            .bind::<Nullable<Text>, _>(update.name.as_deref())
            .bind::<Nullable<Text>, _>(update.description.as_deref())
            .execute(&mut conn)
            .await
            .map_err(diesel_error("update list metadata"))?;
        if affected == 0 {
            return Err(ListRepositoryError::missing(*id));
        }
        Ok(())
    }

    async fn push_item(
        &self,
        id: &ListId,
        item: &ListItem,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError> {
        let item = item_to_json(item)?;
        let sql = update_sql("items = items || jsonb_build_array($3)", "");
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let affected = sql_query(sql)
            .bind::<SqlUuid, _>(id.as_uuid())
            .bind::<Timestamptz, _>(now)
            .bind::<Jsonb, _>(&item)
            .execute(&mut conn)
            .await
            .map_err(diesel_error("append list item"))?;
        if affected == 0 {
            return Err(ListRepositoryError::missing(*id));
        }
        Ok(())
    }

    async fn add_shared_user(
        &self,
        id: &ListId,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, ListRepositoryError> {
        let sql = update_sql(
            "shared_with = array_append(shared_with, $3)",
            " AND owner_id <> $3 AND NOT ($3 = ANY(shared_with))",
        );
        let affected = {
            let mut conn = self.pool.get().await.map_err(pool_error)?;
            sql_query(sql)
                .bind::<SqlUuid, _>(id.as_uuid())
                .bind::<Timestamptz, _>(now)
                .bind::<SqlUuid, _>(user.as_uuid())
                .execute(&mut conn)
                .await
                .map_err(diesel_error("share list"))?
        };
        if affected > 0 {
            return Ok(true);
        }
        match self.current_revision(id).await? {
            Some(_) => Ok(false),
            None => Err(ListRepositoryError::missing(*id)),
        }
    }

    async fn replace_items(
        &self,
        id: &ListId,
        items: &[ListItem],
        expected_revision: u64,
        now: DateTime<Utc>,
    ) -> Result<(), ListRepositoryError> {
        let items = items_to_json(items)?;
        let sql = update_sql("items = $3", " AND revision = $4");
        let affected = {
            let mut conn = self.pool.get().await.map_err(pool_error)?;
            sql_query(sql)
                .bind::<SqlUuid, _>(id.as_uuid())
                .bind::<Timestamptz, _>(now)
                .bind::<Jsonb, _>(&items)
                .bind::<BigInt, _>(revision_to_db(expected_revision)?)
                .execute(&mut conn)
                .await
                .map_err(diesel_error("replace list items"))?
        };
        if affected > 0 {
            return Ok(());
        }
        match self.current_revision(id).await? {
            Some(actual) => Err(ListRepositoryError::revision_mismatch(
                expected_revision,
                actual,
            )),
            None => Err(ListRepositoryError::missing(*id)),
        }
    }

    async fn delete(&self, id: &ListId) -> Result<bool, ListRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(lists::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error("delete list"))?;
        Ok(deleted > 0)
    }
}
