// SPDX-License-Identifier: MIT OR Apache-2.0

//! Create, sign, encode and decode [`Bamboo`] entries.
//!
//! Entries are organised in single-writer append-only logs, created and
//! signed by holders of private keys and stored inside the local spool. The
//! payload is kept separately from the signed header; each entry only holds
//! its hash and size, so payloads can be shipped or dropped independently
//! without losing the integrity of the log.
//!
//! [`Bamboo`]: https://github.com/AljoschaMeyer/bamboo
mod decode;
mod encode;
mod encoded_entry;
#[allow(clippy::module_inception)]
mod entry;
mod error;
mod log_id;
mod seq_num;
mod validate;

pub use decode::decode_entry;
pub(crate) use decode::decode_entry_remainder;
pub use encode::{MAX_PAYLOAD_SIZE, encode_entry, sign_entry};
pub use encoded_entry::EncodedEntry;
pub use entry::Entry;
pub use error::{
    DecodeEntryError, EncodeEntryError, LogIdError, SeqNumError, ValidateEntryError,
};
pub use log_id::LogId;
pub use seq_num::{FIRST_SEQ_NUM, SeqNum};
pub use validate::{validate_chain, validate_links, validate_payload, validate_signature};

/// Tag byte opening every encoded entry; the only defined entry variant.
pub const ENTRY_TAG: u8 = 0x00;
