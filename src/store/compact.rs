// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compaction and purging of stored logs.
use crate::lipmaa::cert_pool;
use crate::store::spool::{content_key, log_prefix, split_content_key};
use crate::store::{Options, Scope, Store, StoreError, Table};

impl Store {
    /// Drops all entries of a log outside the certificate pool of its
    /// latest entry.
    ///
    /// Returns the deleted sequence numbers with their per-deletion status;
    /// an empty log is a no-op. Afterwards every remaining entry is either
    /// the latest one or on its certificate path, so the log head stays
    /// fully verifiable.
    pub fn compact(
        &self,
        author: impl AsRef<[u8]>,
        options: &Options,
    ) -> Result<Vec<(u64, Result<(), StoreError>)>, StoreError> {
        let author = self.resolve_author(author)?;
        let seq_nums = self.all_seqnum_for(&author, options.log_id, &options.clump_id)?;

        let Some(last) = seq_nums.last().copied() else {
            return Ok(Vec::new());
        };
        let pool = cert_pool(last);

        let mut outcomes = Vec::new();
        for seq_num in seq_nums {
            if pool.contains(&seq_num) {
                continue;
            }

            let key = content_key(&author, options.log_id, seq_num);
            let outcome = self.delete_content_row(&options.clump_id, &key);
            outcomes.push((seq_num, outcome));
        }

        log::debug!(
            "compacted log {} of {} down to the certificate pool of entry {}",
            options.log_id,
            author,
            last
        );

        Ok(outcomes)
    }

    /// Deletes stored entries by author and log scope and returns the
    /// remaining [`Store::stored_info`] of the clump.
    ///
    /// `Scope::All` for both truncates the whole content table of the
    /// clump. Purging is idempotent.
    pub fn purge(
        &self,
        author: Scope<&str>,
        log_id: Scope<u64>,
        clump_id: &str,
    ) -> Result<Vec<(String, u64, u64)>, StoreError> {
        let tree = self.content_tree(clump_id)?;

        match (author, log_id) {
            (Scope::All, Scope::All) => {
                tree.clear()?;
            }
            (Scope::All, Scope::Specific(log_id)) => {
                let mut keys = Vec::new();
                for item in tree.iter() {
                    let (key, _) = item?;
                    let (_, key_log_id, _) = split_content_key(&key)?;
                    if key_log_id == log_id {
                        keys.push(key);
                    }
                }
                for key in keys {
                    tree.remove(key)?;
                }
            }
            (Scope::Specific(author), Scope::All) => {
                let author = self.resolve_author(author)?;
                let mut keys = Vec::new();
                for item in tree.scan_prefix(author.to_base62().as_bytes()) {
                    let (key, _) = item?;
                    keys.push(key);
                }
                for key in keys {
                    tree.remove(key)?;
                }
            }
            (Scope::Specific(author), Scope::Specific(log_id)) => {
                let author = self.resolve_author(author)?;
                let mut keys = Vec::new();
                for item in tree.scan_prefix(log_prefix(&author, log_id)) {
                    let (key, _) = item?;
                    keys.push(key);
                }
                for key in keys {
                    tree.remove(key)?;
                }
            }
        }

        self.invalidate_status(Table::Content, clump_id)?;
        log::debug!("purged {:?}/{:?} from clump {:?}", author, log_id, clump_id);

        self.stored_info(clump_id)
    }
}
