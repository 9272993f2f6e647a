//! Database-style store implementations
//!
//! These stores keep users in process memory, in a users file, or in a
//! relational database.

mod accounts;
mod file;
mod in_memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

pub use file::FileBacked;
pub use file::codec::{self, Codec, JsonCodec};
pub use in_memory::InMemory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::{DbKind, SqlxBackend};
