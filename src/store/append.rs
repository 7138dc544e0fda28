// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appending new entries to a log.
use serde_bytes::ByteBuf;

use crate::entry::{Entry, LogId, SeqNum, encode_entry, sign_entry};
use crate::hash::YamfHash;
use crate::identity::Author;
use crate::store::spool::{ContentRow, content_key};
use crate::store::{Options, Store, StoreError};

impl Store {
    /// Appends a payload to the log of the identity stored under `alias`
    /// and returns the signed entry.
    ///
    /// The new entry continues the highest stored sequence number of the
    /// `(author, log_id)` log inside the clump. Link hashes are taken from
    /// the stored predecessor entries; a missing required predecessor fails
    /// with [`StoreError::BrokenChain`]. Concurrent appends to the same log
    /// are not supported, the correct pattern is a single writer per log.
    pub fn append(
        &self,
        payload: &[u8],
        alias: &str,
        options: &Options,
    ) -> Result<Entry, StoreError> {
        let key_pair = self.key_pair(alias)?;
        let author = key_pair.public_key();
        let log_id = LogId::new(options.log_id);

        let latest = self.max_seqnum_for(&author, options.log_id, &options.clump_id)?;
        let seq_num = SeqNum::new(latest + 1)?;

        let backlink = match seq_num.backlink_seq_num() {
            Some(previous) => Some(self.required_link(&author, options, previous)?),
            None => None,
        };

        let lipmaa_link = match seq_num.lipmaa_seq_num() {
            Some(target) if seq_num.is_lipmaa_required() => {
                Some(self.required_link(&author, options, target)?)
            }
            _ => None,
        };

        let entry = sign_entry(
            &log_id,
            &seq_num,
            lipmaa_link.as_ref(),
            backlink.as_ref(),
            payload,
            &key_pair,
        )?;
        let encoded = encode_entry(&entry)?;

        let key = content_key(&author, options.log_id, seq_num.as_u64());
        let row = ContentRow {
            entry: Some(ByteBuf::from(encoded.into_bytes())),
            payload: Some(ByteBuf::from(payload.to_vec())),
        };
        self.put_content_row(&options.clump_id, &key, &row)?;

        log::debug!(
            "appended entry {} to log {} of {} in clump {:?}",
            seq_num,
            log_id,
            author,
            options.clump_id
        );

        Ok(entry)
    }

    /// Hash of the stored entry a new entry links to.
    fn required_link(
        &self,
        author: &Author,
        options: &Options,
        seq_num: SeqNum,
    ) -> Result<YamfHash, StoreError> {
        let bytes = self
            .entry_bytes_at(author, options.log_id, seq_num.as_u64(), &options.clump_id)?
            .ok_or(StoreError::BrokenChain(seq_num.as_u64()))?;
        Ok(YamfHash::new(&bytes))
    }
}
