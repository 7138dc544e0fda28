// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for spool and log engine operations.
use thiserror::Error;

use crate::entry::{DecodeEntryError, EncodeEntryError, SeqNumError, ValidateEntryError};
use crate::identity::IdentityError;

/// Errors returned by operations against a [`crate::Store`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entry, payload or identity is not stored.
    #[error("entry or identity not found")]
    NotFound,

    /// Append could not load a predecessor entry required for linking.
    #[error("append requires entry {0} of the same log, which is not stored")]
    BrokenChain(u64),

    /// Range queries start at 2 and must not be empty.
    #[error("improper range, first must be >= 2 and last >= first")]
    ImproperRange,

    /// An entry with the same position but different bytes is already
    /// stored.
    #[error("existing entry at this position differs from the given bytes")]
    Conflict,

    /// Clump ids partition the spool directory and have to be plain
    /// non-empty names.
    #[error("improper clump id {0:?}")]
    ImproperClumpId(String),

    /// A stored row could not be deserialized.
    #[error("corrupt row in spool")]
    CorruptRow,

    /// Handle errors from sequence number arithmetic.
    #[error(transparent)]
    SeqNum(#[from] SeqNumError),

    /// Handle errors from decoding entries.
    #[error(transparent)]
    Decode(#[from] DecodeEntryError),

    /// Handle errors from encoding and signing entries.
    #[error(transparent)]
    Encode(#[from] EncodeEntryError),

    /// Handle errors from validating entries.
    #[error(transparent)]
    Validate(#[from] ValidateEntryError),

    /// Handle errors from identity handling and resolution.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Handle errors from the underlying indexed store.
    #[error(transparent)]
    Database(#[from] sled::Error),

    /// Handle i/o errors from store interchange.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
