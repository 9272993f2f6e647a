//! File-backed identity store
//!
//! Keeps the user set in memory and mirrors it to a single file after every
//! successful mutation. The file format is chosen by extension, see
//! [`codec::for_path`].

pub mod codec;
mod persistence;

use std::any::Any;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use self::codec::Codec;
use super::accounts;
use crate::Result;
use crate::backend::IdentityStore;
use crate::user::{Requisites, UserId, UserMap};

/// Identity store persisted to a users file.
///
/// One mutex guards the map and the file together. A mutation is applied to a
/// copy of the map, the copy is written out, and only then does it replace the
/// current map; a failed write therefore changes neither the file nor what
/// later calls observe. `authorize` and `count` never touch the file.
///
/// **Security Note**: Passwords are written to the file in plaintext.
pub struct FileBacked {
    path: PathBuf,
    codec: Box<dyn Codec>,
    users: Mutex<UserMap>,
}

impl FileBacked {
    /// Open the users file at `path`, picking the codec from its extension.
    ///
    /// If the file cannot be read, it is created with the default accounts.
    ///
    /// # Errors
    /// - `BackendError::UnsupportedExtension` if no codec handles the extension.
    /// - A decode or corrupted-record error if the file exists but is invalid;
    ///   the file is left as it is.
    /// - `BackendError::FileIo` if the default accounts cannot be written.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let codec = codec::for_path(&path)?;
        Self::open_with_codec(path, codec).await
    }

    /// Open the users file at `path` with an explicit codec.
    pub async fn open_with_codec(path: PathBuf, codec: Box<dyn Codec>) -> Result<Self> {
        let users = match persistence::load(&path, codec.as_ref()).await? {
            Some(users) => {
                tracing::info!(path = %path.display(), users = users.len(), "Loaded users file");
                users
            }
            None => {
                let users = accounts::default_users();
                persistence::save(&path, codec.as_ref(), &users).await?;
                tracing::info!(
                    path = %path.display(),
                    users = users.len(),
                    "Created users file with default accounts"
                );
                users
            }
        };

        Ok(Self {
            path,
            codec,
            users: Mutex::new(users),
        })
    }

    /// Path of the users file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `op` to a copy of the users, persist the copy, then publish it.
    async fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut UserMap) -> Result<T> + Send,
        T: Send,
    {
        let mut users = self.users.lock().await;
        let mut next = users.clone();
        let outcome = op(&mut next)?;
        if let Err(e) = persistence::save(&self.path, self.codec.as_ref(), &next).await {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write users file");
            return Err(e);
        }
        *users = next;
        Ok(outcome)
    }
}

#[async_trait]
impl IdentityStore for FileBacked {
    async fn authorize(&self, requisites: &Requisites) -> Result<UserId> {
        let users = self.users.lock().await;
        accounts::authorize(&users, requisites)
    }

    async fn register(&self, requisites: &Requisites) -> Result<UserId> {
        self.mutate(|users| accounts::register(users, requisites))
            .await
    }

    async fn remove(&self, requisites: &Requisites) -> Result<()> {
        self.mutate(|users| accounts::remove(users, requisites).map(|_| ()))
            .await
    }

    async fn change_requisites(&self, old: &Requisites, new: &Requisites) -> Result<()> {
        self.mutate(|users| accounts::change_requisites(users, old, new).map(|_| ()))
            .await
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.users.lock().await.len())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
