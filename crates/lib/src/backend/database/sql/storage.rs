//! User storage operations for the SQL backend.
//!
//! Reads go straight to the pool. Each mutation begins a transaction, does its
//! validation reads and its single write inside it, and then commits or rolls
//! back through [`finish`].

use sqlx::{Any, Transaction};

use crate::Result;
use crate::backend::errors::BackendError;
use crate::user::{Requisites, UserError, UserId};

use super::{SqlxBackend, SqlxResultExt};

type Tx<'c> = Transaction<'c, Any>;

/// Look up a user's id and password by login.
const SELECT_CREDENTIALS: &str = "SELECT id, password FROM users WHERE username = $1";

/// Validate credentials against the stored row.
pub async fn authorize(backend: &SqlxBackend, requisites: &Requisites) -> Result<UserId> {
    let row: Option<(i64, String)> = sqlx::query_as(SELECT_CREDENTIALS)
        .bind(requisites.login.as_str())
        .fetch_optional(backend.pool())
        .await
        .sql_context("Failed to look up user")?;

    check_credentials(row, requisites)
}

/// Insert a new user unless the login is taken.
pub async fn register(backend: &SqlxBackend, requisites: &Requisites) -> Result<UserId> {
    let _guard = backend.write_guard().await;
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    let outcome = insert_user(&mut tx, requisites).await;
    finish(tx, outcome).await
}

/// Delete a user after validating their credentials.
pub async fn remove(backend: &SqlxBackend, requisites: &Requisites) -> Result<()> {
    let _guard = backend.write_guard().await;
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    let outcome = delete_user(&mut tx, requisites).await;
    finish(tx, outcome).await
}

/// Replace a user's login and password, keeping their id.
pub async fn change_requisites(
    backend: &SqlxBackend,
    old: &Requisites,
    new: &Requisites,
) -> Result<()> {
    let _guard = backend.write_guard().await;
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    let outcome = update_user(&mut tx, old, new).await;
    finish(tx, outcome).await
}

/// Count stored users.
pub async fn count(backend: &SqlxBackend) -> Result<usize> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(backend.pool())
        .await
        .sql_context("Failed to count users")?;

    Ok(usize::try_from(count).unwrap_or_default())
}

async fn insert_user(tx: &mut Tx<'_>, requisites: &Requisites) -> Result<UserId> {
    let login = requisites.login.as_str();

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(login)
        .fetch_optional(&mut **tx)
        .await
        .sql_context("Failed to look up user")?;
    if existing.is_some() {
        return Err(UserError::LoginOccupied {
            login: login.to_string(),
        }
        .into());
    }

    let inserted: Option<(i64,)> =
        sqlx::query_as("INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id")
            .bind(login)
            .bind(requisites.password.as_str())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| write_error(e, login, "Failed to insert user"))?;

    match inserted {
        Some((id,)) if id >= 1 => Ok(UserId::new(id)),
        other => Err(BackendError::InvalidGeneratedId {
            login: login.to_string(),
            id: other.map(|(id,)| id),
        }
        .into()),
    }
}

async fn delete_user(tx: &mut Tx<'_>, requisites: &Requisites) -> Result<()> {
    let row: Option<(i64, String)> = sqlx::query_as(SELECT_CREDENTIALS)
        .bind(requisites.login.as_str())
        .fetch_optional(&mut **tx)
        .await
        .sql_context("Failed to look up user")?;
    let id = check_credentials(row, requisites)?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id.get())
        .execute(&mut **tx)
        .await
        .sql_context("Failed to delete user")?;

    expect_one_row(result.rows_affected(), "delete", &requisites.login)
}

async fn update_user(tx: &mut Tx<'_>, old: &Requisites, new: &Requisites) -> Result<()> {
    // Both logins in one read: the old row validates the caller, a row for
    // the new login owned by someone else means it is taken.
    let rows: Vec<(i64, String, String)> =
        sqlx::query_as("SELECT id, username, password FROM users WHERE username IN ($1, $2)")
            .bind(old.login.as_str())
            .bind(new.login.as_str())
            .fetch_all(&mut **tx)
            .await
            .sql_context("Failed to look up users")?;

    let current = rows
        .iter()
        .find(|(_, username, _)| *username == old.login)
        .map(|(id, _, password)| (*id, password.clone()));
    let id = check_credentials(current, old)?;

    let taken = rows
        .iter()
        .any(|(other, username, _)| *username == new.login && *other != id.get());
    if new.login != old.login && taken {
        return Err(UserError::LoginOccupied {
            login: new.login.clone(),
        }
        .into());
    }

    let result = sqlx::query("UPDATE users SET username = $1, password = $2 WHERE id = $3")
        .bind(new.login.as_str())
        .bind(new.password.as_str())
        .bind(id.get())
        .execute(&mut **tx)
        .await
        .map_err(|e| write_error(e, &new.login, "Failed to update user"))?;

    expect_one_row(result.rows_affected(), "update", &old.login)
}

fn check_credentials(row: Option<(i64, String)>, requisites: &Requisites) -> Result<UserId> {
    match row {
        None => Err(UserError::UnknownLogin {
            login: requisites.login.clone(),
        }
        .into()),
        Some((_, password)) if password != requisites.password => Err(UserError::WrongPassword {
            login: requisites.login.clone(),
        }
        .into()),
        Some((id, _)) => Ok(UserId::new(id)),
    }
}

fn expect_one_row(affected: u64, operation: &'static str, login: &str) -> Result<()> {
    if affected == 1 {
        Ok(())
    } else {
        Err(BackendError::UnexpectedRowCount {
            operation,
            login: login.to_string(),
            affected,
        }
        .into())
    }
}

/// A unique violation on `username` means another writer took the login first.
fn write_error(e: sqlx::Error, login: &str, context: &str) -> crate::Error {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return UserError::LoginOccupied {
            login: login.to_string(),
        }
        .into();
    }
    BackendError::SqlxError {
        reason: format!("{context}: {e}"),
        source: Some(e),
    }
    .into()
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is reported together with the error that caused it.
async fn finish<T>(tx: Tx<'_>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .sql_context("Failed to commit transaction")?;
            Ok(value)
        }
        Err(err) => match tx.rollback().await {
            Ok(()) => Err(err),
            Err(source) => {
                tracing::error!(cause = %err, error = %source, "Failed to roll back transaction");
                Err(BackendError::RollbackFailed {
                    cause: Box::new(err),
                    source,
                }
                .into())
            }
        },
    }
}
