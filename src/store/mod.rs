// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-addressed local spool and the log engine operating on it.
//!
//! The spool is a single embedded [`sled`] database under `spool_dir`,
//! exposing three logical tables: `content` and `status` partitioned by
//! clump, and a clump-independent `identity` table. All public operations
//! are methods on the [`Store`] handle which keeps the tables open for its
//! lifetime; durability is whatever the engine provides on [`Store::flush`]
//! and drop.
mod append;
mod compact;
mod error;
mod identity;
mod interchange;
mod query;
mod spool;
mod status;

use std::path::Path;

pub use error::StoreError;

use crate::entry::Entry;

/// Name of the clump used when no other is given.
pub const DEFAULT_CLUMP: &str = "default";

/// Handle to a local spool.
///
/// Constructed from a spool directory and threaded through every operation;
/// dropping the handle closes the underlying database.
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) db: sled::Db,
}

impl Store {
    /// Opens the spool at the given directory, creating it when absent.
    pub fn open(spool_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(spool_dir.as_ref())?;
        log::debug!("opened spool at {:?}", spool_dir.as_ref());
        Ok(Self { db })
    }

    /// Flushes all pending writes to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Lists the clumps present in this spool, sorted.
    pub fn clumps(&self) -> Vec<String> {
        let mut clumps: Vec<String> = self
            .db
            .tree_names()
            .iter()
            .filter_map(|name| {
                let name = std::str::from_utf8(name).ok()?;
                Some(name.strip_suffix("/content")?.to_owned())
            })
            .collect();
        clumps.sort();
        clumps
    }
}

/// Return shape of retrieval operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fetched {
    /// Decoded entry header together with its payload.
    Entry {
        /// The decoded entry.
        entry: Entry,
        /// The payload bytes the entry commits to.
        payload: Vec<u8>,
    },

    /// Canonical entry bytes with the payload appended.
    Binary(Vec<u8>),
}

impl Fetched {
    /// Returns the decoded entry, if this is the decoded shape.
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Fetched::Entry { entry, .. } => Some(entry),
            Fetched::Binary(_) => None,
        }
    }

    /// Returns the payload bytes, if this is the decoded shape.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Fetched::Entry { payload, .. } => Some(payload),
            Fetched::Binary(_) => None,
        }
    }

    /// Returns the raw bytes, if this is the binary shape.
    pub fn into_binary(self) -> Option<Vec<u8>> {
        match self {
            Fetched::Entry { .. } => None,
            Fetched::Binary(bytes) => Some(bytes),
        }
    }
}

/// Requested return shape of retrieval operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Decoded entry structure.
    #[default]
    Entry,

    /// Raw canonical bytes, payload appended.
    Binary,
}

/// Per-call options, all defaulted.
#[derive(Clone, Debug)]
pub struct Options {
    /// Return shape of retrieved entries.
    pub format: Format,

    /// Log discriminator.
    pub log_id: u64,

    /// Clump partition the operation runs against.
    pub clump_id: String,

    /// Re-run the validator on read.
    pub revalidate: bool,

    /// Overwrite existing rows on import.
    pub replace: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: Format::Entry,
            log_id: 0,
            clump_id: DEFAULT_CLUMP.to_owned(),
            revalidate: false,
            replace: false,
        }
    }
}

/// Selects all values or one specific value, used to scope purges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope<T> {
    /// Every value.
    All,

    /// This value only.
    Specific(T),
}

/// Logical tables covered by status reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    /// Per-clump entry and payload rows.
    Content,

    /// The spool-global identity table.
    Identity,
}

impl Table {
    /// Name under which the table's status row is cached.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Table::Content => "content",
            Table::Identity => "identity",
        }
    }
}
