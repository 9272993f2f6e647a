//! Core data types for the identity directory

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a user.
///
/// Assigned by the store on registration. Valid identifiers are >= 1 and are
/// never reused while the owning user exists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether this identifier can belong to a stored user.
    pub const fn is_valid(self) -> bool {
        self.0 >= 1
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A login/password pair supplied by a client.
///
/// Passwords are stored and compared as given.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisites {
    pub login: String,
    pub password: String,
}

impl Requisites {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Requisites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requisites")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// What a store keeps under each login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub password: String,
    pub id: UserId,
}

/// Login-keyed collection held by the in-process stores.
pub type UserMap = HashMap<String, Account>;

/// A flat user record, as written to a users file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub id: UserId,
}

impl User {
    pub fn new(login: impl Into<String>, password: impl Into<String>, id: UserId) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            id,
        }
    }

    /// Split the record into its map key and value.
    pub fn into_entry(self) -> (String, Account) {
        (
            self.login,
            Account {
                password: self.password,
                id: self.id,
            },
        )
    }

    /// Collect a map back into records, ordered by identifier.
    pub fn from_map(users: &UserMap) -> Vec<User> {
        let mut records: Vec<User> = users
            .iter()
            .map(|(login, account)| User::new(login.clone(), account.password.clone(), account.id))
            .collect();
        records.sort_by_key(|user| user.id);
        records
    }
}
