//! Operations over a login-keyed account map.
//!
//! Shared by the in-memory and file-backed stores, which differ only in how
//! they guard and persist the map. Each function either applies its whole
//! change or returns an error without touching the map.

use crate::Result;
use crate::backend::allocator::first_vacant_id;
use crate::constants::DEFAULT_USERS;
use crate::user::{Account, Requisites, UserError, UserId, UserMap};

/// The accounts a new users file starts with.
pub(crate) fn default_users() -> UserMap {
    DEFAULT_USERS
        .iter()
        .map(|(login, password, id)| {
            (
                login.to_string(),
                Account {
                    password: password.to_string(),
                    id: UserId::new(*id),
                },
            )
        })
        .collect()
}

pub(crate) fn authorize(users: &UserMap, requisites: &Requisites) -> Result<UserId> {
    let account = users
        .get(&requisites.login)
        .ok_or_else(|| UserError::UnknownLogin {
            login: requisites.login.clone(),
        })?;
    if account.password != requisites.password {
        return Err(UserError::WrongPassword {
            login: requisites.login.clone(),
        }
        .into());
    }
    Ok(account.id)
}

pub(crate) fn register(users: &mut UserMap, requisites: &Requisites) -> Result<UserId> {
    if users.contains_key(&requisites.login) {
        return Err(UserError::LoginOccupied {
            login: requisites.login.clone(),
        }
        .into());
    }
    let id = first_vacant_id(users.values().map(|account| account.id));
    users.insert(
        requisites.login.clone(),
        Account {
            password: requisites.password.clone(),
            id,
        },
    );
    Ok(id)
}

/// Returns the identifier the removed user had.
pub(crate) fn remove(users: &mut UserMap, requisites: &Requisites) -> Result<UserId> {
    let id = authorize(users, requisites)?;
    users.remove(&requisites.login);
    Ok(id)
}

/// Returns the identifier of the changed user.
pub(crate) fn change_requisites(
    users: &mut UserMap,
    old: &Requisites,
    new: &Requisites,
) -> Result<UserId> {
    let id = authorize(users, old)?;
    if new.login != old.login {
        if users.contains_key(&new.login) {
            return Err(UserError::LoginOccupied {
                login: new.login.clone(),
            }
            .into());
        }
        users.remove(&old.login);
        users.insert(
            new.login.clone(),
            Account {
                password: new.password.clone(),
                id,
            },
        );
    } else if let Some(account) = users.get_mut(&old.login) {
        account.password = new.password.clone();
    }
    Ok(id)
}
