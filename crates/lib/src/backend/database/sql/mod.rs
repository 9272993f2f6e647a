//! SQL-based identity store.
//!
//! This module provides a relational implementation of the `IdentityStore`
//! trait on top of sqlx.
//!
//! ## Available Databases
//!
//! - **SQLite** (feature: `sqlite`): Embedded database, on disk or in memory
//! - **PostgreSQL** (feature: `postgres`): PostgreSQL server
//!
//! ## Architecture
//!
//! The backend uses sqlx with `AnyPool` for multi-database support. Every
//! mutation runs in a transaction that is committed on success and rolled
//! back on any error; see [`storage`] for the statements.
//!
//! SQLite admits a single writer. Write transactions are therefore queued on
//! an in-process mutex so that two deferred transactions never both hold a
//! read lock while waiting to upgrade. PostgreSQL relies on the unique
//! constraint on `username` and on affected-row checks instead.
//!
//! ## Schema and Migrations
//!
//! The database schema is defined in the [`schema`] module and automatically
//! initialized when connecting.

mod storage;

/// Schema definition and migration system.
pub mod schema;

use std::any::Any;
#[cfg(feature = "postgres")]
use std::time::Duration;

use async_trait::async_trait;
use sqlx::AnyPool;
use sqlx::Executor;
use sqlx::any::AnyPoolOptions;
use tokio::sync::{Mutex, MutexGuard};

use crate::Result;
use crate::backend::IdentityStore;
use crate::backend::errors::BackendError;
use crate::user::{Requisites, UserId};

/// Extension trait for sqlx Result types to simplify error handling.
///
/// Similar to `anyhow::Context`, this trait adds a method to convert
/// sqlx errors to `BackendError::SqlxError` with a context message.
pub(crate) trait SqlxResultExt<T> {
    /// Convert sqlx error to BackendError with context message.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

/// Database backend kind for SQL dialect selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    /// SQLite database
    Sqlite,
    /// PostgreSQL database
    Postgres,
}

/// SQL-based identity store using sqlx.
///
/// # Thread Safety
///
/// `SqlxBackend` is `Send + Sync`. The sqlx pool handles connection pooling;
/// see the module documentation for how SQLite writers are serialized.
///
/// # Test Isolation
///
/// For PostgreSQL, each backend instance can use its own schema.
/// Use `connect_postgres_isolated()` to create an isolated backend for testing.
pub struct SqlxBackend {
    pool: AnyPool,
    kind: DbKind,
    writer: Mutex<()>,
}

impl SqlxBackend {
    fn from_pool(pool: AnyPool, kind: DbKind) -> Self {
        Self {
            pool,
            kind,
            writer: Mutex::new(()),
        }
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Get the database kind.
    pub fn kind(&self) -> DbKind {
        self.kind
    }

    /// Check if this backend is using SQLite.
    pub fn is_sqlite(&self) -> bool {
        self.kind == DbKind::Sqlite
    }

    /// Check if this backend is using PostgreSQL.
    pub fn is_postgres(&self) -> bool {
        self.kind == DbKind::Postgres
    }

    /// Close the pool, waiting for connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Serialize write transactions where the engine needs it.
    pub(crate) async fn write_guard(&self) -> Option<MutexGuard<'_, ()>> {
        if self.is_sqlite() {
            Some(self.writer.lock().await)
        } else {
            None
        }
    }
}

// SQLite-specific implementations
#[cfg(feature = "sqlite")]
impl SqlxBackend {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use yagogame::backend::database::SqlxBackend;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let backend = SqlxBackend::open_sqlite("users.db").await.unwrap();
    /// }
    /// ```
    pub async fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        // mode=rwc: read-write-create (create file if it doesn't exist)
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_sqlite(&url).await
    }

    /// Connect to a SQLite database using a connection URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite:./users.db")
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        // Install any driver support
        sqlx::any::install_default_drivers();

        let is_in_memory = url.contains("mode=memory");

        // A shared-cache in-memory database is destroyed when its last
        // connection closes, and concurrent connections to it fail with
        // SQLITE_LOCKED instead of waiting. Keep exactly one connection open.
        let pool = if is_in_memory {
            AnyPoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url)
                .await
                .sql_context("Failed to connect to SQLite")?
        } else {
            // - busy_timeout=5000: Wait up to 5s for locks before failing
            // - journal_mode=WAL: readers do not block the writer
            // - synchronous=NORMAL: Balanced durability (safe with WAL)
            AnyPoolOptions::new()
                .max_connections(5)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute(
                            "PRAGMA busy_timeout = 5000;
                             PRAGMA journal_mode = WAL;
                             PRAGMA synchronous = NORMAL;",
                        )
                        .await?;
                        Ok(())
                    })
                })
                .connect(url)
                .await
                .sql_context("Failed to connect to SQLite")?
        };

        let backend = Self::from_pool(pool, DbKind::Sqlite);

        // Initialize schema
        schema::initialize(&backend).await?;

        Ok(backend)
    }

    /// Create an in-memory SQLite database.
    ///
    /// The database exists only for the lifetime of this backend instance.
    /// Useful for testing.
    pub async fn sqlite_in_memory() -> Result<Self> {
        // Use a unique name per instance to avoid sharing between tests.
        let unique_id = uuid::Uuid::new_v4();
        let url = format!("sqlite:file:mem_{unique_id}?mode=memory&cache=shared");
        Self::connect_sqlite(&url).await
    }
}

// PostgreSQL-specific implementations
#[cfg(feature = "postgres")]
impl SqlxBackend {
    /// Connect to a PostgreSQL database using a connection URL.
    ///
    /// This connects to the default (public) schema. For test isolation,
    /// use `connect_postgres_isolated()` instead.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use yagogame::backend::database::SqlxBackend;
    ///
    /// let backend = SqlxBackend::connect_postgres("postgres://localhost/yagogame").await.unwrap();
    /// ```
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        Self::connect_postgres_with_schema(url, None).await
    }

    /// Connect to a PostgreSQL database with a specific schema for isolation.
    ///
    /// Creates the schema if `schema_name` is provided and points every pooled
    /// connection at it.
    async fn connect_postgres_with_schema(url: &str, schema_name: Option<String>) -> Result<Self> {
        // Install any driver support
        sqlx::any::install_default_drivers();

        if let Some(ref schema) = schema_name {
            let temp_pool = AnyPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .sql_context("Failed to connect to PostgreSQL")?;

            let create_schema = format!("CREATE SCHEMA IF NOT EXISTS {schema}");
            sqlx::query(&create_schema)
                .execute(&temp_pool)
                .await
                .sql_context(&format!("Failed to create schema {schema}"))?;

            temp_pool.close().await;
        }

        // Isolated (test) connections use a smaller pool to avoid exhausting
        // PostgreSQL's max_connections when running many tests in parallel.
        let is_isolated = schema_name.is_some();
        let mut pool_options = AnyPoolOptions::new();

        if is_isolated {
            pool_options = pool_options
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(30));
        } else {
            pool_options = pool_options.max_connections(5);
        }

        let pool = pool_options
            .after_connect(move |conn, _meta| {
                let schema = schema_name.clone();
                Box::pin(async move {
                    if let Some(ref s) = schema {
                        let set_path = format!("SET search_path TO {s}");
                        conn.execute(set_path.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;

        let backend = Self::from_pool(pool, DbKind::Postgres);

        // Tables are created in the current search_path
        schema::initialize(&backend).await?;

        Ok(backend)
    }

    /// Connect to a PostgreSQL database with test isolation.
    ///
    /// Creates a unique schema for this backend instance, ensuring tests
    /// don't interfere with each other when run in parallel.
    pub async fn connect_postgres_isolated(url: &str) -> Result<Self> {
        // PostgreSQL schema names must start with a letter and be lowercase
        let unique_id = uuid::Uuid::new_v4().simple().to_string();
        let schema_name = format!("test_{unique_id}");
        Self::connect_postgres_with_schema(url, Some(schema_name)).await
    }
}

#[async_trait]
impl IdentityStore for SqlxBackend {
    async fn authorize(&self, requisites: &Requisites) -> Result<UserId> {
        storage::authorize(self, requisites).await
    }

    async fn register(&self, requisites: &Requisites) -> Result<UserId> {
        storage::register(self, requisites).await
    }

    async fn remove(&self, requisites: &Requisites) -> Result<()> {
        storage::remove(self, requisites).await
    }

    async fn change_requisites(&self, old: &Requisites, new: &Requisites) -> Result<()> {
        storage::change_requisites(self, old, new).await
    }

    async fn count(&self) -> Result<usize> {
        storage::count(self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
