//! `RwLock<HashMap>`-backed identity store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserId};

/// In-memory user repository enforcing unique emails and usernames.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> UserPersistenceError {
    UserPersistenceError::query("in-memory user store lock poisoned")
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.values().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        if let Some(username) = user.username() {
            if users
                .values()
                .any(|existing| existing.username() == Some(username))
            {
                return Err(UserPersistenceError::duplicate_username(username.as_ref()));
            }
        }
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|user| user.email() == email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{UserDraft, UserProfile, Username};

    fn user(email: &str, username: Option<&str>) -> User {
        let now = Utc::now();
        User::new(UserDraft {
            id: UserId::random(),
            email: EmailAddress::new(email).expect("email"),
            username: username.map(|name| Username::new(name).expect("username")),
            password_hash: "hash".to_owned(),
            profile: UserProfile::new("Ada", "Lovelace", None).expect("profile"),
            created_at: now,
            updated_at: now,
        })
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_duplicate_email_case_insensitively() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("ada@example.com", None))
            .await
            .expect("first insert");

        let err = repo
            .insert(&user("ADA@example.com", None))
            .await
            .expect_err("duplicate");

        assert_eq!(err, UserPersistenceError::duplicate_email("ada@example.com"));
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_duplicate_username() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("a@example.com", Some("ada")))
            .await
            .expect("first insert");

        let err = repo
            .insert(&user("b@example.com", Some("ada")))
            .await
            .expect_err("duplicate");

        assert_eq!(err, UserPersistenceError::duplicate_username("ada"));
    }

    #[rstest]
    #[tokio::test]
    async fn finds_by_email_and_id() {
        let repo = InMemoryUserRepository::new();
        let stored = user("ada@example.com", None);
        repo.insert(&stored).await.expect("insert");

        let by_email = repo
            .find_by_email(stored.email())
            .await
            .expect("lookup");
        let by_id = repo.find_by_id(&stored.id()).await.expect("lookup");

        assert_eq!(by_email.as_ref(), Some(&stored));
        assert_eq!(by_id, Some(stored));
    }
}
