//! PostgreSQL adapters built on Diesel, `diesel-async` and `bb8`.
//!
//! Adapters translate between row structs (`models`, `schema`) and domain
//! types and hold no business rules. Every database failure is mapped into
//! the owning port's error type.
//!
//! ```no_run
//! use grocer::outbound::persistence::{
//!     DbPool, DieselListRepository, PoolConfig, run_pending_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://grocer@localhost/grocer";
//! run_pending_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let lists = DieselListRepository::new(pool);
//! # let _ = lists;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_list_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_list_repository::DieselListRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
