//! In-memory adapters for the list and identity stores.
//!
//! Used when no database URL is configured and by integration tests. State
//! lives behind a `RwLock` and is lost on restart.

mod list_repository;
mod user_repository;

pub use list_repository::InMemoryListRepository;
pub use user_repository::InMemoryUserRepository;
