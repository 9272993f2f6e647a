//! In-memory identity store
//!
//! This module provides an in-memory implementation of the `IdentityStore`
//! trait, suitable for testing, development, or deployments where users do
//! not need to survive a restart.

use std::any::Any;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::accounts;
use crate::Result;
use crate::backend::IdentityStore;
use crate::user::{Requisites, UserId, UserMap};

/// A simple in-memory store using a `HashMap` keyed by login.
///
/// `authorize` and `count` share the lock; mutations hold it exclusively for
/// their whole duration, so identifier allocation cannot race.
///
/// **Security Note**: Passwords are kept in plaintext.
#[derive(Debug, Default)]
pub struct InMemory {
    users: RwLock<UserMap>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given users.
    ///
    /// The caller is responsible for the map honoring the store invariants
    /// (identifiers >= 1 and unique).
    pub fn from_users(users: UserMap) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    /// A copy of the current users.
    pub async fn snapshot(&self) -> UserMap {
        self.users.read().await.clone()
    }
}

#[async_trait]
impl IdentityStore for InMemory {
    async fn authorize(&self, requisites: &Requisites) -> Result<UserId> {
        let users = self.users.read().await;
        accounts::authorize(&users, requisites)
    }

    async fn register(&self, requisites: &Requisites) -> Result<UserId> {
        let mut users = self.users.write().await;
        accounts::register(&mut users, requisites)
    }

    async fn remove(&self, requisites: &Requisites) -> Result<()> {
        let mut users = self.users.write().await;
        accounts::remove(&mut users, requisites).map(|_| ())
    }

    async fn change_requisites(&self, old: &Requisites, new: &Requisites) -> Result<()> {
        let mut users = self.users.write().await;
        accounts::change_requisites(&mut users, old, new).map(|_| ())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.users.read().await.len())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
