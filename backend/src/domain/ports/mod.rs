//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod list_command;
mod list_query;
mod list_repository;
mod password_hasher;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use account_service::MockAccountService;
pub use account_service::{AccountService, AuthenticatedSession};
#[cfg(test)]
pub use list_command::MockListCommand;
pub use list_command::{
    AddItemRequest, CreateListRequest, ListCommand, UpdateItemRequest, UpdateListRequest,
};
#[cfg(test)]
pub use list_query::MockListQuery;
pub use list_query::ListQuery;
#[cfg(test)]
pub use list_repository::MockListRepository;
pub use list_repository::{ListRepository, ListRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{IssuedToken, TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
