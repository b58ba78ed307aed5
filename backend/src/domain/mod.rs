//! Domain primitives, aggregates, services, and ports.
//!
//! Purpose: keep list-sharing and item-mutation rules independent of HTTP
//! and storage. Inbound adapters call the driving ports in [`ports`];
//! outbound adapters implement the driven ports declared there.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`lists`]: the list aggregate, access policy, and [`lists::ListService`].
//! - [`AccountManager`]: signup, signin, and current-user lookup.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod lists;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountManager;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN, SignupCredentials, SignupParts,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::lists::ListService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, User, UserDraft, UserId, UserProfile, UserProfileView, UserValidationError,
    Username,
};
