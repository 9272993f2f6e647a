//!
//! yagogame: identity directory and credential gate for the yagogame server.
//!
//! ## Core Concepts
//!
//! * **Requisites (`user::Requisites`)**: A login/password pair supplied by a client, used both to
//!   look a user up and as the value written on registration or change.
//! * **Identity stores (`backend::IdentityStore`)**: The uniform contract (authorize, register,
//!   remove, change requisites, count) implemented by every storage strategy:
//!     * **InMemory (`backend::database::InMemory`)**: A lock-protected map, no persistence.
//!     * **FileBacked (`backend::database::FileBacked`)**: The same map mirrored to a file through a
//!       pluggable `Codec`, rewritten in full after every mutation.
//!     * **SqlxBackend (`backend::database::SqlxBackend`)**: SQLite or PostgreSQL with every mutation
//!       inside a transaction (requires the "sqlite" or "postgres" feature).
//! * **Directory (`directory::Directory`)**: The explicit, cheaply cloned handle to the one store
//!   chosen at startup. Every consumer receives it by value; there is no global table.
//! * **Gate (`gate`)**: axum middleware that authorizes every incoming call from its credential
//!   headers and attaches the resulting `Identity` to that call only.
//! * **Service (`service`)**: The account routes (register, remove, change requisites) and the
//!   health endpoint, wired behind the gate.

pub mod backend;
pub mod constants;
pub mod directory;
pub mod gate;
pub mod service;
pub mod user;

pub use directory::Directory;
pub use user::{Requisites, UserId};

/// Result type used throughout the yagogame library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the yagogame library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain errors: credentials did not match or a login is taken
    #[error(transparent)]
    User(user::UserError),

    /// Persistence errors from the storage backends
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::User(_) => "user",
            Error::Backend(_) => "backend",
        }
    }

    /// The domain error behind this error, if any.
    ///
    /// Looks through a failed rollback to the error that caused it.
    pub fn user_error(&self) -> Option<&user::UserError> {
        match self {
            Error::User(user_err) => Some(user_err),
            #[cfg(any(feature = "sqlite", feature = "postgres"))]
            Error::Backend(backend::BackendError::RollbackFailed { cause, .. }) => {
                cause.user_error()
            }
            Error::Backend(_) => None,
        }
    }

    /// Check if this error reports a login that does not exist.
    pub fn is_unknown_login(&self) -> bool {
        self.user_error().is_some_and(|e| e.is_unknown_login())
    }

    /// Check if this error reports a password mismatch.
    pub fn is_wrong_password(&self) -> bool {
        self.user_error().is_some_and(|e| e.is_wrong_password())
    }

    /// Check if this error reports a login that is already taken.
    pub fn is_login_occupied(&self) -> bool {
        self.user_error().is_some_and(|e| e.is_login_occupied())
    }

    /// Check if this error is a domain error a client can act on.
    ///
    /// Domain errors are reported to callers as authentication failures;
    /// everything else, including a domain error whose rollback failed, is an
    /// internal failure.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Error::User(_))
    }

    /// Check if this error is a storage anomaly rather than a domain outcome.
    pub fn is_persistence_error(&self) -> bool {
        !self.is_domain_error()
    }

    /// Check if this error is a configuration problem detected at construction.
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_config_error(),
            Error::User(_) => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_io_error(),
            Error::User(_) => false,
        }
    }

    /// Check if this error indicates stored data failed validation.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_integrity_error(),
            Error::User(_) => false,
        }
    }
}
