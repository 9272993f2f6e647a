use std::sync::Arc;

use tempfile::TempDir;
use yagogame::{
    Directory, Requisites,
    backend::{IdentityStore, database::{FileBacked, InMemory}},
};

/// A store under test, plus whatever has to outlive it.
pub struct TestStore {
    pub label: &'static str,
    pub store: Arc<dyn IdentityStore>,
    _dir: Option<TempDir>,
}

impl TestStore {
    pub fn directory(&self) -> Directory {
        Directory::new(self.store.clone())
    }
}

pub fn creds(login: &str, password: &str) -> Requisites {
    Requisites::new(login, password)
}

pub fn in_memory_store() -> TestStore {
    TestStore {
        label: "inmemory",
        store: Arc::new(InMemory::new()),
        _dir: None,
    }
}

/// A file-backed store in a fresh directory, seeded with the default accounts.
pub async fn file_store() -> TestStore {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = FileBacked::open(dir.path().join("users.json"))
        .await
        .expect("Failed to open users file");
    TestStore {
        label: "file",
        store: Arc::new(store),
        _dir: Some(dir),
    }
}

#[cfg(feature = "sqlite")]
pub async fn sqlite_store() -> TestStore {
    use yagogame::backend::database::SqlxBackend;

    TestStore {
        label: "sqlite",
        store: Arc::new(
            SqlxBackend::sqlite_in_memory()
                .await
                .expect("Failed to create SQLite backend"),
        ),
        _dir: None,
    }
}

#[cfg(feature = "postgres")]
pub async fn postgres_store() -> TestStore {
    use yagogame::backend::database::SqlxBackend;

    let url = std::env::var("TEST_POSTGRES_URL")
        .unwrap_or_else(|_| "postgres://localhost/yagogame_test".to_string());
    TestStore {
        label: "postgres",
        store: Arc::new(
            SqlxBackend::connect_postgres_isolated(&url)
                .await
                .expect("Failed to connect to PostgreSQL"),
        ),
        _dir: None,
    }
}

/// Creates a test store based on the TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory store (default)
/// - "file": FileBacked store in a temp directory
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// TEST_BACKEND=sqlite cargo test --features sqlite
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/yagogame_test" \
///   cargo test --features postgres
/// ```
pub async fn test_store() -> TestStore {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("file") => file_store().await,
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                sqlite_store().await
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                postgres_store().await
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        _ => in_memory_store(),
    }
}

/// Every backend that runs without external services, plus the TEST_BACKEND
/// choice when it names PostgreSQL.
pub async fn all_stores() -> Vec<TestStore> {
    let mut stores = vec![in_memory_store(), file_store().await];
    #[cfg(feature = "sqlite")]
    stores.push(sqlite_store().await);
    if std::env::var("TEST_BACKEND").as_deref() == Ok("postgres") {
        stores.push(test_store().await);
    }
    stores
}
