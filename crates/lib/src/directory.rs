//! Handle to the identity store chosen at startup
//!
//! The `Directory` is how the rest of the application reaches the store. It
//! is created once by the composing binary and cloned into every consumer
//! (the gate, the account routes); there is no process-wide table.

use std::{any::Any, sync::Arc};

use handle_trait::Handle;

use crate::{
    Result,
    backend::IdentityStore,
    user::{Requisites, UserId},
};

/// Shared handle to an identity store.
///
/// Delegates every operation to the wrapped store and logs the outcome, so
/// all backends report the same events.
#[derive(Clone, Handle)]
pub struct Directory {
    store: Arc<dyn IdentityStore>,
}

impl Directory {
    /// Create a new Directory wrapping a store
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Create a Directory that owns the given store
    pub fn from_store<S: IdentityStore>(store: S) -> Self {
        Self::new(Arc::new(store))
    }

    /// Validate credentials and return the owner's identifier
    pub async fn authorize(&self, requisites: &Requisites) -> Result<UserId> {
        match self.store.authorize(requisites).await {
            Ok(id) => {
                tracing::info!(login = %requisites.login, %id, "client authenticated");
                Ok(id)
            }
            Err(e) => {
                report(&e, "authorize", &requisites.login);
                Err(e)
            }
        }
    }

    /// Register a new user
    pub async fn register(&self, requisites: &Requisites) -> Result<UserId> {
        match self.store.register(requisites).await {
            Ok(id) => {
                tracing::info!(login = %requisites.login, %id, "client registered");
                Ok(id)
            }
            Err(e) => {
                report(&e, "register", &requisites.login);
                Err(e)
            }
        }
    }

    /// Remove a user after validating their credentials
    pub async fn remove(&self, requisites: &Requisites) -> Result<()> {
        match self.store.remove(requisites).await {
            Ok(()) => {
                tracing::info!(login = %requisites.login, "client removed");
                Ok(())
            }
            Err(e) => {
                report(&e, "remove", &requisites.login);
                Err(e)
            }
        }
    }

    /// Change a user's login and password
    pub async fn change_requisites(&self, old: &Requisites, new: &Requisites) -> Result<()> {
        match self.store.change_requisites(old, new).await {
            Ok(()) => {
                tracing::info!(login = %old.login, new_login = %new.login, "requisites changed");
                Ok(())
            }
            Err(e) => {
                report(&e, "change_requisites", &old.login);
                Err(e)
            }
        }
    }

    /// Number of stored users
    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    /// Returns the wrapped store as `Any` for downcasting
    pub fn as_any(&self) -> &dyn Any {
        self.store.as_any()
    }
}

fn report(err: &crate::Error, operation: &str, login: &str) {
    if err.is_domain_error() {
        tracing::debug!(operation, login, error = %err, "request rejected");
    } else {
        tracing::error!(operation, login, error = %err, "identity store failure");
    }
}
