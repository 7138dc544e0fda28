// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Validate;
use crate::entry::validate::validate_links;
use crate::entry::{LogId, SeqNum, ValidateEntryError};
use crate::hash::YamfHash;
use crate::identity::{Author, Signature};

/// Signed header of a single log entry.
///
/// The payload itself is stored separately from the header; it is referenced
/// by hash and size only. First entries carry no links, every other entry
/// has a backlink and, where it would differ from the backlink, a lipmaa
/// link (see [`crate::lipmaa`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Public key of the log writer.
    pub(crate) author: Author,

    /// Log of this author the entry belongs to.
    pub(crate) log_id: LogId,

    /// Position of the entry in its log.
    pub(crate) seq_num: SeqNum,

    /// Hash of the entry at the skip-link position, where required.
    pub(crate) lipmaa_link: Option<YamfHash>,

    /// Hash of the immediately preceding entry.
    pub(crate) backlink: Option<YamfHash>,

    /// Byte length of the payload.
    pub(crate) payload_size: u64,

    /// Hash of the payload.
    pub(crate) payload_hash: YamfHash,

    /// Signature over the canonical entry bytes with this field zero-filled.
    pub(crate) signature: Signature,
}

impl Entry {
    /// Returns public key of the log writer.
    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Returns log id of entry.
    pub fn log_id(&self) -> &LogId {
        &self.log_id
    }

    /// Returns sequence number of entry.
    pub fn seq_num(&self) -> &SeqNum {
        &self.seq_num
    }

    /// Returns hash of lipmaa entry when given.
    pub fn lipmaa_link(&self) -> Option<&YamfHash> {
        self.lipmaa_link.as_ref()
    }

    /// Returns hash of backlink entry when given.
    pub fn backlink(&self) -> Option<&YamfHash> {
        self.backlink.as_ref()
    }

    /// Returns payload size of entry.
    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    /// Returns payload hash of entry.
    pub fn payload_hash(&self) -> &YamfHash {
        &self.payload_hash
    }

    /// Returns signature of entry.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns true if a dedicated lipmaa link has to be given.
    pub fn is_lipmaa_required(&self) -> bool {
        self.seq_num.is_lipmaa_required()
    }
}

impl Validate for Entry {
    type Error = ValidateEntryError;

    fn validate(&self) -> Result<(), Self::Error> {
        validate_links(self)
    }
}
