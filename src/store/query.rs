// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval queries over stored logs.
//!
//! All queries accept any author reference form resolved by
//! [`Store::as_base62`]. Rows missing either the entry or the payload half
//! are treated as absent; with `revalidate` set, signature, payload and the
//! locally checkable link hashes are verified again on read.
use std::collections::BTreeMap;

use crate::entry::{EncodedEntry, SeqNum, decode_entry, validate_chain, validate_payload, validate_signature};
use crate::identity::Author;
use crate::lipmaa::cert_pool;
use crate::store::spool::{ContentRow, content_key, decode_value, log_prefix, split_content_key};
use crate::store::{Fetched, Format, Options, Store, StoreError};

impl Store {
    /// Retrieves the entry at the given sequence number.
    ///
    /// Returns [`StoreError::NotFound`] when the entry or its payload is not
    /// stored.
    pub fn log_entry(
        &self,
        author: impl AsRef<[u8]>,
        seq_num: u64,
        options: &Options,
    ) -> Result<Fetched, StoreError> {
        let author = self.resolve_author(author)?;
        self.fetch(&author, seq_num, options)
    }

    /// Highest stored sequence number of the log, 0 when the log is empty.
    pub fn max_seqnum(
        &self,
        author: impl AsRef<[u8]>,
        options: &Options,
    ) -> Result<u64, StoreError> {
        let author = self.resolve_author(author)?;
        self.max_seqnum_for(&author, options.log_id, &options.clump_id)
    }

    /// Sequence numbers of all stored entries of the log, ascending.
    pub fn all_seqnum(
        &self,
        author: impl AsRef<[u8]>,
        options: &Options,
    ) -> Result<Vec<u64>, StoreError> {
        let author = self.resolve_author(author)?;
        self.all_seqnum_for(&author, options.log_id, &options.clump_id)
    }

    /// Retrieves the stored part of the certificate pool of the entry at the
    /// given sequence number, ascending.
    ///
    /// These are the entries required to verify the target back to the log
    /// root; ancestors which are not stored are left out.
    pub fn log_at(
        &self,
        author: impl AsRef<[u8]>,
        seq_num: u64,
        options: &Options,
    ) -> Result<Vec<Fetched>, StoreError> {
        let author = self.resolve_author(author)?;
        let mut entries = Vec::new();

        for seq_num in cert_pool(seq_num).into_iter().rev() {
            match self.fetch(&author, seq_num, options) {
                Ok(fetched) => entries.push(fetched),
                Err(StoreError::NotFound) => continue,
                Err(error) => return Err(error),
            }
        }

        Ok(entries)
    }

    /// Retrieves the stored entries with sequence numbers in
    /// `[first, last]`, ascending.
    ///
    /// The range must start at 2 or later and must not be empty.
    pub fn log_range(
        &self,
        author: impl AsRef<[u8]>,
        first: u64,
        last: u64,
        options: &Options,
    ) -> Result<Vec<Fetched>, StoreError> {
        if first < 2 || last < first {
            return Err(StoreError::ImproperRange);
        }

        let author = self.resolve_author(author)?;
        let mut entries = Vec::new();

        for seq_num in first..=last {
            match self.fetch(&author, seq_num, options) {
                Ok(fetched) => entries.push(fetched),
                Err(StoreError::NotFound) => continue,
                Err(error) => return Err(error),
            }
        }

        Ok(entries)
    }

    /// Retrieves all stored entries of the log, ascending.
    pub fn full_log(
        &self,
        author: impl AsRef<[u8]>,
        options: &Options,
    ) -> Result<Vec<Fetched>, StoreError> {
        let author = self.resolve_author(author)?;
        let tree = self.content_tree(&options.clump_id)?;
        let mut entries = Vec::new();

        for item in tree.scan_prefix(log_prefix(&author, options.log_id)) {
            let (key, value) = item?;
            let row: ContentRow = decode_value(&value)?;
            if row.entry.is_none() || row.payload.is_none() {
                continue;
            }

            let (_, _, seq_num) = split_content_key(&key)?;
            match self.fetch(&author, seq_num, options) {
                Ok(fetched) => entries.push(fetched),
                Err(StoreError::NotFound) => continue,
                Err(error) => return Err(error),
            }
        }

        Ok(entries)
    }

    /// Sequence numbers of the certificate pool of the entry at the given
    /// sequence number, restricted to what is stored, descending.
    pub fn certificate_pool(
        &self,
        author: impl AsRef<[u8]>,
        seq_num: u64,
        options: &Options,
    ) -> Result<Vec<u64>, StoreError> {
        let author = self.resolve_author(author)?;
        let max = self.max_seqnum_for(&author, options.log_id, &options.clump_id)?;

        let mut pool = Vec::new();
        for seq_num in cert_pool(seq_num) {
            if seq_num > max {
                continue;
            }
            let stored = self
                .entry_bytes_at(&author, options.log_id, seq_num, &options.clump_id)?
                .is_some();
            if stored {
                pool.push(seq_num);
            }
        }

        Ok(pool)
    }

    /// Summarizes the content table of a clump as sorted
    /// `(author identifier, log id, highest sequence number)` triples.
    pub fn stored_info(&self, clump_id: &str) -> Result<Vec<(String, u64, u64)>, StoreError> {
        let tree = self.content_tree(clump_id)?;
        let mut info: BTreeMap<(String, u64), u64> = BTreeMap::new();

        for item in tree.iter() {
            let (key, value) = item?;
            let row: ContentRow = decode_value(&value)?;
            if row.entry.is_none() {
                continue;
            }

            let (author, log_id, seq_num) = split_content_key(&key)?;
            let max = info.entry((author, log_id)).or_insert(seq_num);
            if seq_num > *max {
                *max = seq_num;
            }
        }

        Ok(info
            .into_iter()
            .map(|((author, log_id), seq_num)| (author, log_id, seq_num))
            .collect())
    }

    /// Loads, decodes and optionally revalidates one entry row.
    fn fetch(
        &self,
        author: &Author,
        seq_num: u64,
        options: &Options,
    ) -> Result<Fetched, StoreError> {
        let key = content_key(author, options.log_id, seq_num);
        let row = self
            .get_content_row(&options.clump_id, &key)?
            .ok_or(StoreError::NotFound)?;

        // Half-written rows read as absent; an overwrite may heal them.
        let (entry_bytes, payload) = match (row.entry, row.payload) {
            (Some(entry), Some(payload)) => (entry.into_vec(), payload.into_vec()),
            _ => return Err(StoreError::NotFound),
        };

        let encoded = EncodedEntry::from_bytes(&entry_bytes);
        let entry = decode_entry(&encoded)?;

        if options.revalidate {
            validate_signature(&entry, &encoded)?;
            validate_payload(&entry, &payload)?;
            validate_chain(&entry, |link: SeqNum| {
                self.entry_bytes_at(author, options.log_id, link.as_u64(), &options.clump_id)
                    .ok()
                    .flatten()
            })?;
        }

        match options.format {
            Format::Entry => Ok(Fetched::Entry { entry, payload }),
            Format::Binary => {
                let mut bytes = entry_bytes;
                bytes.extend_from_slice(&payload);
                Ok(Fetched::Binary(bytes))
            }
        }
    }
}
