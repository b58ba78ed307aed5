//! Grocer library: shared grocery lists behind an actix-web API.
//!
//! The crate follows a hexagonal layout. [`domain`] holds the list aggregate,
//! access policy, and services; [`inbound`] adapts HTTP requests onto the
//! domain ports; [`outbound`] provides PostgreSQL, in-memory, and credential
//! adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
