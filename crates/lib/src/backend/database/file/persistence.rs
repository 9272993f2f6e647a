//! File I/O for the file-backed store
//!
//! A users file is always read and written whole. Writes go to a sibling
//! temporary file that is then renamed over the target, so readers only ever
//! see a complete snapshot.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::codec::Codec;
use crate::Result;
use crate::backend::errors::BackendError;
use crate::user::UserMap;

/// Load the user set from `path`.
///
/// Returns `Ok(None)` when the file cannot be read at all (missing, a
/// directory, permission denied). Content that was read but does not decode is
/// an error.
pub(crate) async fn load(path: &Path, codec: &dyn Codec) -> Result<Option<UserMap>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Users file is not readable");
            return Ok(None);
        }
    };
    codec.decode(&mut bytes.as_slice()).map(Some)
}

/// Replace the content of `path` with the encoded user set.
///
/// The staging file is synced before the rename and the directory after it,
/// so once this returns the new snapshot is on disk.
pub(crate) async fn save(path: &Path, codec: &dyn Codec, users: &UserMap) -> Result<()> {
    let mut bytes = Vec::new();
    codec.encode(users, &mut bytes)?;

    let staging = staging_path(path);
    stage(&staging, &bytes).await?;
    if let Err(source) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(BackendError::FileIo {
            path: path.to_path_buf(),
            source,
        }
        .into());
    }
    sync_parent(path).await
}

/// Write `bytes` to `staging` and sync it, removing the file on failure.
async fn stage(staging: &Path, bytes: &[u8]) -> Result<()> {
    if let Err(source) = write_synced(staging, bytes).await {
        let _ = tokio::fs::remove_file(staging).await;
        return Err(BackendError::FileIo {
            path: staging.to_path_buf(),
            source,
        }
        .into());
    }
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    // Surfaces errors from the buffered write
    file.flush().await?;
    file.sync_all().await
}

/// Make the rename itself durable.
#[cfg(unix)]
async fn sync_parent(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let synced = match tokio::fs::File::open(parent).await {
        Ok(dir) => dir.sync_all().await,
        Err(e) => Err(e),
    };
    synced.map_err(|source| {
        BackendError::FileIo {
            path: parent.to_path_buf(),
            source,
        }
        .into()
    })
}

#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> Result<()> {
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4().simple()))
}
