//! Storage backends for the identity directory
//!
//! This module provides the `IdentityStore` trait and its implementations
//! organized by category (currently only `database`).
//!
//! The trait is the one contract every storage strategy honors, so the rest of
//! the crate (the `Directory` handle, the gate, the service) never knows which
//! strategy is in use. A store is picked once at startup and shared as
//! `Arc<dyn IdentityStore>`.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::user::{Requisites, UserId};

pub mod allocator;
pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Identity store trait abstracting how users are kept.
///
/// Every operation validates in the same order: unknown login, then wrong
/// password, then occupation of a new login. Mutations are atomic: a failed
/// operation leaves the stored users as they were.
///
/// All implementations must be `Send` and `Sync` so a store can be shared
/// across tasks, and implement `Any` so callers can downcast to label the
/// active backend.
#[async_trait]
pub trait IdentityStore: Send + Sync + Any {
    /// Validate credentials and return the identifier of their owner.
    ///
    /// # Errors
    /// `UserError::UnknownLogin` if no user has this login,
    /// `UserError::WrongPassword` if the password differs.
    async fn authorize(&self, requisites: &Requisites) -> Result<UserId>;

    /// Create a user with a freshly assigned identifier and return it.
    ///
    /// # Errors
    /// `UserError::LoginOccupied` if the login is already taken.
    async fn register(&self, requisites: &Requisites) -> Result<UserId>;

    /// Validate credentials as `authorize` does, then delete the user.
    async fn remove(&self, requisites: &Requisites) -> Result<()>;

    /// Validate `old`, then replace the login and password with `new`.
    ///
    /// The identifier is preserved. If the login changes and `new.login`
    /// belongs to someone else, fails with `UserError::LoginOccupied`.
    async fn change_requisites(&self, old: &Requisites, new: &Requisites) -> Result<()>;

    /// Number of stored users.
    async fn count(&self) -> Result<usize>;

    /// Returns a reference to the store instance as `Any`.
    fn as_any(&self) -> &dyn Any;
}

/// Short name of the backend behind `store`, for health reports and logs.
pub fn backend_label(store: &dyn IdentityStore) -> &'static str {
    let any = store.as_any();
    if let Some(label) = sql_label(any) {
        label
    } else if any.is::<database::FileBacked>() {
        "file"
    } else if any.is::<database::InMemory>() {
        "inmemory"
    } else {
        "unknown"
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn sql_label(any: &dyn Any) -> Option<&'static str> {
    use database::{DbKind, SqlxBackend};

    any.downcast_ref::<SqlxBackend>().map(|sql| match sql.kind() {
        DbKind::Sqlite => "sqlite",
        DbKind::Postgres => "postgres",
    })
}

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
fn sql_label(_any: &dyn Any) -> Option<&'static str> {
    None
}
