// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached status digests over the spool tables.
//!
//! For every `(clump, table)` pair a Base62-encoded short digest over the
//! table's rows can be requested; the value is cached in the status table
//! and invalidated by any mutation of the underlying rows. The status table
//! itself has no status.
use sled::Tree;

use crate::base62;
use crate::hash::short_hash;
use crate::store::{Store, StoreError, Table};

impl Store {
    /// Returns the Base62-encoded short digest summarizing the given table.
    ///
    /// Cached until the next mutation of the table; recomputed on demand by
    /// folding the table's rows in key order into a canonical byte stream.
    pub fn current_hash(&self, table: Table, clump_id: &str) -> Result<String, StoreError> {
        let status = self.status_tree_for(table, clump_id)?;

        if let Some(cached) = status.get(table.name())? {
            return String::from_utf8(cached.to_vec()).map_err(|_| StoreError::CorruptRow);
        }

        let rows = match table {
            Table::Content => self.content_tree(clump_id)?,
            Table::Identity => self.identity_tree()?,
        };

        let mut stream = Vec::new();
        for item in rows.iter() {
            let (key, value) = item?;
            stream.extend_from_slice(&(key.len() as u64).to_be_bytes());
            stream.extend_from_slice(&key);
            stream.extend_from_slice(&(value.len() as u64).to_be_bytes());
            stream.extend_from_slice(&value);
        }

        let encoded = base62::encode(&short_hash(&stream));
        status.insert(table.name(), encoded.as_bytes())?;

        Ok(encoded)
    }

    /// Drops the cached status row of the given table.
    pub(crate) fn invalidate_status(&self, table: Table, clump_id: &str) -> Result<(), StoreError> {
        self.status_tree_for(table, clump_id)?.remove(table.name())?;
        Ok(())
    }

    /// The status table caching digests for the given table: per clump for
    /// content, spool-global for identities.
    fn status_tree_for(&self, table: Table, clump_id: &str) -> Result<Tree, StoreError> {
        match table {
            Table::Content => self.status_tree(clump_id),
            Table::Identity => self.global_status_tree(),
        }
    }
}
