// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk interchange of entries and whole spools.
//!
//! Binary interchange items are canonical entry bytes, optionally followed
//! directly by the payload the entry commits to. Store interchange
//! serializes the identity table and the content table of every clump into
//! CBOR files inside a directory and re-materializes them elsewhere.
use std::fs;
use std::path::Path;

use serde_bytes::ByteBuf;

use crate::entry::{
    DecodeEntryError, EncodedEntry, Entry, SeqNum, decode_entry_remainder, validate_chain,
    validate_payload, validate_signature,
};
use crate::store::spool::{ContentRow, content_key, decode_value, encode_value};
use crate::store::{Options, Store, StoreError, Table};

impl Store {
    /// Imports a batch of binary entries, returning one outcome per item in
    /// input order.
    ///
    /// Each item is decoded, validated against already stored predecessors
    /// (where available) and stored under its own author, log id and
    /// sequence number inside the clump given by `options`. Existing rows
    /// are kept unless `replace` is set; an existing entry with different
    /// bytes fails with [`StoreError::Conflict`] either way.
    pub fn import_binaries<B: AsRef<[u8]>>(
        &self,
        binaries: &[B],
        options: &Options,
    ) -> Vec<Result<Entry, StoreError>> {
        binaries
            .iter()
            .map(|bytes| self.import_binary(bytes.as_ref(), options))
            .collect()
    }

    fn import_binary(&self, bytes: &[u8], options: &Options) -> Result<Entry, StoreError> {
        let (entry, consumed) = decode_entry_remainder(bytes)?;
        let canonical = &bytes[..consumed];
        let trailing = &bytes[consumed..];

        let payload_size = entry.payload_size() as usize;
        let payload = if payload_size == 0 {
            Some(&trailing[..0])
        } else if trailing.is_empty() {
            None
        } else if trailing.len() >= payload_size {
            Some(&trailing[..payload_size])
        } else {
            return Err(DecodeEntryError::UnexpectedEof("payload").into());
        };

        let encoded = EncodedEntry::from_bytes(canonical);
        validate_signature(&entry, &encoded)?;
        if let Some(payload) = payload {
            validate_payload(&entry, payload)?;
        }

        let author = *entry.author();
        let log_id = entry.log_id().as_u64();
        validate_chain(&entry, |link: SeqNum| {
            self.entry_bytes_at(&author, log_id, link.as_u64(), &options.clump_id)
                .ok()
                .flatten()
        })?;

        let key = content_key(&author, log_id, entry.seq_num().as_u64());
        let existing = self.get_content_row(&options.clump_id, &key)?;

        if let Some(existing) = &existing {
            if let Some(stored) = &existing.entry {
                if stored.as_slice() != canonical {
                    return Err(StoreError::Conflict);
                }
            }

            if !options.replace {
                // The existing row is kept untouched.
                return Ok(entry);
            }
        }

        // A replaced row keeps its stored payload when the import carries
        // none.
        let payload = payload
            .map(|payload| ByteBuf::from(payload.to_vec()))
            .or_else(|| existing.and_then(|row| row.payload));

        let row = ContentRow {
            entry: Some(ByteBuf::from(canonical.to_vec())),
            payload,
        };
        self.put_content_row(&options.clump_id, &key, &row)?;

        log::debug!(
            "imported entry {} of log {} of {} into clump {:?}",
            entry.seq_num(),
            entry.log_id(),
            author,
            options.clump_id
        );

        Ok(entry)
    }

    /// Serializes the whole spool, all clumps plus the identity table, into
    /// the given directory.
    pub fn export_store(&self, dir: impl AsRef<Path>) -> Result<(), StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut identities: Vec<(String, ByteBuf)> = Vec::new();
        for item in self.identity_tree()?.iter() {
            let (alias, value) = item?;
            let alias = String::from_utf8(alias.to_vec()).map_err(|_| StoreError::CorruptRow)?;
            identities.push((alias, ByteBuf::from(value.to_vec())));
        }
        fs::write(dir.join("identity.cbor"), encode_value(&identities)?)?;

        for clump_id in self.clumps() {
            let mut rows: Vec<(ByteBuf, ByteBuf)> = Vec::new();
            for item in self.content_tree(&clump_id)?.iter() {
                let (key, value) = item?;
                rows.push((ByteBuf::from(key.to_vec()), ByteBuf::from(value.to_vec())));
            }

            let clump_dir = dir.join(&clump_id);
            fs::create_dir_all(&clump_dir)?;
            fs::write(clump_dir.join("content.cbor"), encode_value(&rows)?)?;
        }

        log::debug!("exported spool to {:?}", dir);
        Ok(())
    }

    /// Re-materializes a spool serialized by [`Store::export_store`] into
    /// this one.
    ///
    /// Imported rows overwrite rows sharing their keys; everything else is
    /// left in place.
    pub fn import_store(&self, dir: impl AsRef<Path>) -> Result<(), StoreError> {
        let dir = dir.as_ref();

        let identity_file = dir.join("identity.cbor");
        if identity_file.is_file() {
            let identities: Vec<(String, ByteBuf)> = decode_value(&fs::read(identity_file)?)?;

            let tree = self.identity_tree()?;
            for (alias, value) in identities {
                tree.insert(alias.as_bytes(), value.into_vec())?;
            }
            self.invalidate_status(Table::Identity, "")?;
        }

        for item in fs::read_dir(dir)? {
            let item = item?;
            if !item.path().is_dir() {
                continue;
            }

            let clump_id = item
                .file_name()
                .into_string()
                .map_err(|_| StoreError::CorruptRow)?;
            let content_file = item.path().join("content.cbor");
            if !content_file.is_file() {
                continue;
            }

            let rows: Vec<(ByteBuf, ByteBuf)> = decode_value(&fs::read(content_file)?)?;

            let tree = self.content_tree(&clump_id)?;
            for (key, value) in rows {
                tree.insert(key.into_vec(), value.into_vec())?;
            }
            self.invalidate_status(Table::Content, &clump_id)?;
        }

        log::debug!("imported spool from {:?}", dir);
        Ok(())
    }
}
