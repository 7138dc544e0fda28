// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level access to the spool tables.
//!
//! Content rows are keyed by the 43-byte Base62 author identifier followed
//! by big-endian log id and sequence number, so the engine's key order gives
//! author → log → sequence iteration and prefix scans for free. Row values
//! are CBOR; either half of a content row may be absent transiently and
//! retrieval treats such rows as not found.
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use sled::Tree;

use crate::base62;
use crate::identity::Author;
use crate::store::{Store, StoreError, Table};

/// Value of a content table row.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct ContentRow {
    /// Canonical entry bytes.
    pub entry: Option<ByteBuf>,

    /// Payload bytes the entry commits to.
    pub payload: Option<ByteBuf>,
}

/// Value of an identity table row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct IdentityRow {
    /// Secret key half.
    pub secret: ByteBuf,

    /// Public key half.
    pub public: ByteBuf,
}

/// Builds the content table key for one entry position.
pub(crate) fn content_key(author: &Author, log_id: u64, seq_num: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(base62::ENCODED_KEY_LEN + 16);
    key.extend_from_slice(author.to_base62().as_bytes());
    key.extend_from_slice(&log_id.to_be_bytes());
    key.extend_from_slice(&seq_num.to_be_bytes());
    key
}

/// Builds the key prefix covering all entries of one log.
pub(crate) fn log_prefix(author: &Author, log_id: u64) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(base62::ENCODED_KEY_LEN + 8);
    prefix.extend_from_slice(author.to_base62().as_bytes());
    prefix.extend_from_slice(&log_id.to_be_bytes());
    prefix
}

/// Splits a content table key back into author identifier, log id and
/// sequence number.
pub(crate) fn split_content_key(key: &[u8]) -> Result<(String, u64, u64), StoreError> {
    if key.len() != base62::ENCODED_KEY_LEN + 16 {
        return Err(StoreError::CorruptRow);
    }

    let author = std::str::from_utf8(&key[..base62::ENCODED_KEY_LEN])
        .map_err(|_| StoreError::CorruptRow)?
        .to_owned();

    let mut log_id = [0u8; 8];
    log_id.copy_from_slice(&key[base62::ENCODED_KEY_LEN..base62::ENCODED_KEY_LEN + 8]);

    let mut seq_num = [0u8; 8];
    seq_num.copy_from_slice(&key[base62::ENCODED_KEY_LEN + 8..]);

    Ok((author, u64::from_be_bytes(log_id), u64::from_be_bytes(seq_num)))
}

/// Serializes a row value into its CBOR bytes.
pub(crate) fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(value, &mut bytes).map_err(|_| StoreError::CorruptRow)?;
    Ok(bytes)
}

/// Deserializes a row value from its CBOR bytes.
pub(crate) fn decode_value<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, StoreError> {
    ciborium::de::from_reader(bytes).map_err(|_| StoreError::CorruptRow)
}

impl Store {
    /// Content table of the given clump.
    pub(crate) fn content_tree(&self, clump_id: &str) -> Result<Tree, StoreError> {
        Ok(self
            .db
            .open_tree(format!("{}/content", valid_clump(clump_id)?))?)
    }

    /// Status table of the given clump.
    pub(crate) fn status_tree(&self, clump_id: &str) -> Result<Tree, StoreError> {
        Ok(self
            .db
            .open_tree(format!("{}/status", valid_clump(clump_id)?))?)
    }

    /// The spool-global identity table.
    pub(crate) fn identity_tree(&self) -> Result<Tree, StoreError> {
        Ok(self.db.open_tree("identity")?)
    }

    /// The spool-global status table, caching the identity table status.
    pub(crate) fn global_status_tree(&self) -> Result<Tree, StoreError> {
        Ok(self.db.open_tree("status")?)
    }

    pub(crate) fn get_content_row(
        &self,
        clump_id: &str,
        key: &[u8],
    ) -> Result<Option<ContentRow>, StoreError> {
        match self.content_tree(clump_id)?.get(key)? {
            Some(bytes) => Ok(Some(decode_value(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn put_content_row(
        &self,
        clump_id: &str,
        key: &[u8],
        row: &ContentRow,
    ) -> Result<(), StoreError> {
        self.content_tree(clump_id)?
            .insert(key, encode_value(row)?)?;
        self.invalidate_status(Table::Content, clump_id)?;
        Ok(())
    }

    pub(crate) fn delete_content_row(&self, clump_id: &str, key: &[u8]) -> Result<(), StoreError> {
        self.content_tree(clump_id)?.remove(key)?;
        self.invalidate_status(Table::Content, clump_id)?;
        Ok(())
    }

    /// Canonical bytes of the entry at the given position, when stored.
    pub(crate) fn entry_bytes_at(
        &self,
        author: &Author,
        log_id: u64,
        seq_num: u64,
        clump_id: &str,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let key = content_key(author, log_id, seq_num);
        Ok(self
            .get_content_row(clump_id, &key)?
            .and_then(|row| row.entry)
            .map(ByteBuf::into_vec))
    }

    /// Sequence numbers of all stored entries of one log, ascending.
    pub(crate) fn all_seqnum_for(
        &self,
        author: &Author,
        log_id: u64,
        clump_id: &str,
    ) -> Result<Vec<u64>, StoreError> {
        let tree = self.content_tree(clump_id)?;
        let mut seq_nums = Vec::new();

        for item in tree.scan_prefix(log_prefix(author, log_id)) {
            let (key, value) = item?;
            let row: ContentRow = decode_value(&value)?;
            if row.entry.is_some() {
                let (_, _, seq_num) = split_content_key(&key)?;
                seq_nums.push(seq_num);
            }
        }

        Ok(seq_nums)
    }

    /// Highest stored sequence number of one log, 0 when the log is empty.
    pub(crate) fn max_seqnum_for(
        &self,
        author: &Author,
        log_id: u64,
        clump_id: &str,
    ) -> Result<u64, StoreError> {
        Ok(self
            .all_seqnum_for(author, log_id, clump_id)?
            .last()
            .copied()
            .unwrap_or(0))
    }
}

fn valid_clump(clump_id: &str) -> Result<&str, StoreError> {
    if clump_id.is_empty() || clump_id.contains('/') {
        return Err(StoreError::ImproperClumpId(clump_id.to_owned()));
    }
    Ok(clump_id)
}

#[cfg(test)]
mod tests {
    use crate::identity::KeyPair;

    use super::{content_key, log_prefix, split_content_key};

    #[test]
    fn key_round_trip() {
        let author = KeyPair::new().public_key();
        let key = content_key(&author, 1337, 14);

        let (identifier, log_id, seq_num) = split_content_key(&key).unwrap();
        assert_eq!(identifier, author.to_base62());
        assert_eq!(log_id, 1337);
        assert_eq!(seq_num, 14);

        assert!(split_content_key(&key[..10]).is_err());
    }

    #[test]
    fn keys_sort_by_log_then_seq_num() {
        let author = KeyPair::new().public_key();

        let mut keys = vec![
            content_key(&author, 1, 1),
            content_key(&author, 0, 14),
            content_key(&author, 0, 2),
        ];
        keys.sort();

        assert_eq!(split_content_key(&keys[0]).unwrap().1, 0);
        assert_eq!(split_content_key(&keys[0]).unwrap().2, 2);
        assert_eq!(split_content_key(&keys[2]).unwrap().1, 1);

        for key in &keys[..2] {
            assert!(key.starts_with(&log_prefix(&author, 0)));
        }
    }
}
