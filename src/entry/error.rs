// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for creating, encoding, decoding or validating entries and
//! their regarding data types like sequence numbers or log ids.
use thiserror::Error;

use crate::hash::HashError;

/// Errors from `entry::decode` module.
///
/// All of them mean the input bytes are not a well-formed entry.
#[derive(Error, Debug)]
pub enum DecodeEntryError {
    /// Input ended before the named field was complete.
    #[error("unexpected end of input while decoding {0}")]
    UnexpectedEof(&'static str),

    /// First byte does not name a known entry variant.
    #[error("unknown entry tag {0:#04x}")]
    UnknownTag(u8),

    /// Varint field could not be decoded.
    #[error("invalid varint while decoding {0}")]
    InvalidVarint(&'static str),

    /// Sequence numbers start at 1.
    #[error("entry sequence number must be larger than 0")]
    InvalidSeqNum,

    /// Link or payload hash is not a valid yamf container.
    #[error(transparent)]
    InvalidHash(#[from] HashError),
}

/// Errors from `entry::encode` module.
#[derive(Error, Debug)]
pub enum EncodeEntryError {
    /// Payloads above the maximum size are not stored.
    #[error("payload of {0} bytes exceeds maximum of {1} bytes")]
    PayloadTooLarge(usize, usize),

    /// Handle errors from `entry::validate` module.
    #[error(transparent)]
    ValidateEntryError(#[from] ValidateEntryError),
}

/// Errors from `entry::validate` module.
#[derive(Error, Debug)]
pub enum ValidateEntryError {
    /// Invalid configuration of backlink and lipmaa link hashes for this
    /// sequence number.
    #[error("backlink and lipmaa link not valid for this sequence number")]
    InvalidLinks,

    /// Backlink and lipmaa link hashes should be different where both exist.
    #[error("backlink and lipmaa link are identical")]
    BacklinkAndLipmaaLinkIdentical,

    /// Signature does not verify against the author and entry bytes.
    #[error("signature does not match claimed author")]
    InvalidSignature,

    /// Payload needs to match payload hash of entry.
    #[error("payload does not match payload hash of entry")]
    PayloadHashMismatch,

    /// Payload needs to match payload size of entry.
    #[error("payload does not match payload size of entry")]
    PayloadSizeMismatch,

    /// Stored predecessor entry has a different hash than the backlink
    /// claims.
    #[error("claimed backlink does not match stored predecessor")]
    BacklinkMismatch,

    /// Stored predecessor entry has a different hash than the lipmaa link
    /// claims.
    #[error("claimed lipmaa link does not match stored predecessor")]
    LipmaaLinkMismatch,
}

/// Errors from `SeqNum` struct.
#[derive(Error, Debug)]
pub enum SeqNumError {
    /// Sequence numbers are always positive.
    #[error("sequence number can not be zero or negative")]
    NotZeroOrNegative,

    /// Conversion to u64 from string failed.
    #[error("string contains invalid u64 value")]
    InvalidU64String,
}

/// Errors from `LogId` struct.
#[derive(Error, Debug)]
pub enum LogIdError {
    /// Conversion to u64 from string failed.
    #[error("string contains invalid u64 value")]
    InvalidU64String,
}
