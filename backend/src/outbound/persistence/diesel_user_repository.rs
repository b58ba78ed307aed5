//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, User, UserDraft, UserId, UserProfile, UserValidationError, Username,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, unique_violation_constraint};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Diesel implementation of the identity store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> UserPersistenceError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        )
    }
}

/// Classify an insert failure. Unique violations on anything other than the
/// username index are reported against the email.
fn insert_error(error: diesel::result::Error, user: &User) -> UserPersistenceError {
    match (unique_violation_constraint(&error), user.username()) {
        (Some(USERNAME_CONSTRAINT), Some(username)) => {
            UserPersistenceError::duplicate_username(username.as_ref())
        }
        (Some(_), _) => UserPersistenceError::duplicate_email(user.email().as_ref()),
        (None, _) => diesel_error("insert user")(error),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    let corrupt = |field: &'static str| {
        move |err: UserValidationError| {
            UserPersistenceError::query(format!("user {id} has invalid {field}: {err}"))
        }
    };
    let email = EmailAddress::new(&row.email).map_err(corrupt("email"))?;
    let username = row
        .username
        .as_deref()
        .map(Username::new)
        .transpose()
        .map_err(corrupt("username"))?;
    let profile = UserProfile::new(&row.first_name, &row.last_name, row.avatar_url.as_deref())
        .map_err(corrupt("profile"))?;
    Ok(User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        email,
        username,
        password_hash: row.password_hash,
        profile,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            username: user.username().map(AsRef::as_ref),
            password_hash: user.password_hash(),
            first_name: user.profile().first_name(),
            last_name: user.profile().last_name(),
            avatar_url: user.profile().avatar_url(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| insert_error(err, user))?;
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find user by email"))?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error("find user by id"))?;
        row.map(row_to_user).transpose()
    }
}
