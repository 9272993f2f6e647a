//! Encoding of a user set to and from a byte stream.
//!
//! The file-backed store is written against the `Codec` trait; which codec a
//! file gets is decided by its extension in [`for_path`].

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::user::{User, UserMap};

/// A format a user set can be stored in.
pub trait Codec: Send + Sync {
    /// Write the full user set to `writer`.
    fn encode(&self, users: &UserMap, writer: &mut dyn Write) -> Result<()>;

    /// Read a full user set from `reader`, rejecting records that break the
    /// store invariants.
    fn decode(&self, reader: &mut dyn Read) -> Result<UserMap>;

    /// File extension this codec is selected for, without the dot.
    fn extension(&self) -> &'static str;
}

/// Pick the codec for a users file by its extension.
///
/// # Errors
/// `BackendError::UnsupportedExtension` if no codec handles the extension,
/// including when the path has none.
pub fn for_path(path: &Path) -> Result<Box<dyn Codec>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => Ok(Box::new(JsonCodec)),
        _ => Err(BackendError::UnsupportedExtension {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

/// JSON array of `{ "login", "password", "id" }` objects.
///
/// Output is tab-indented, ordered by identifier and ends with a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, users: &UserMap, writer: &mut dyn Write) -> Result<()> {
        let records = User::from_map(users);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(b"\t"));
        records
            .serialize(&mut serializer)
            .map_err(|source| BackendError::SerializationFailed { source })?;
        writer
            .write_all(b"\n")
            .map_err(|e| BackendError::SerializationFailed {
                source: serde_json::Error::io(e),
            })?;
        Ok(())
    }

    fn decode(&self, reader: &mut dyn Read) -> Result<UserMap> {
        let records: Vec<User> = serde_json::from_reader(reader)
            .map_err(|source| BackendError::DecodeFailed { source })?;

        let mut users = UserMap::with_capacity(records.len());
        let mut ids = HashSet::with_capacity(records.len());
        for record in records {
            if let Some(reason) = invalid_reason(&record) {
                return Err(corrupted(&record, reason));
            }
            if users.contains_key(&record.login) {
                return Err(corrupted(&record, "duplicate login"));
            }
            if !ids.insert(record.id) {
                return Err(corrupted(&record, "duplicate id"));
            }
            let (login, account) = record.into_entry();
            users.insert(login, account);
        }
        Ok(users)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

fn invalid_reason(record: &User) -> Option<&'static str> {
    if record.login.is_empty() {
        Some("empty login")
    } else if record.password.is_empty() {
        Some("empty password")
    } else if !record.id.is_valid() {
        Some("id below 1")
    } else {
        None
    }
}

fn corrupted(record: &User, reason: &str) -> crate::Error {
    tracing::warn!(login = %record.login, id = %record.id, reason, "Rejecting corrupted user record");
    BackendError::CorruptedRecord {
        login: record.login.clone(),
        id: record.id.get(),
        reason: reason.to_string(),
    }
    .into()
}
