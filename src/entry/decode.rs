// SPDX-License-Identifier: MIT OR Apache-2.0

//! Methods to decode an entry.
//!
//! ```text
//!             ┌────────────┐                         ┌─────┐
//!  bytes ───► │EncodedEntry│ ────decode_entry()────► │Entry│
//!             └────────────┘                         └─────┘
//! ```
//!
//! Decoding is a single pass of a cursor over the byte slice with explicit
//! length checks. Which link fields to expect follows from the sequence
//! number alone, so no look-ahead is needed. Trailing bytes after the
//! signature are not part of the entry; interchange formats append the
//! payload there.
//!
//! Decoding checks that the bytes are well-formed, nothing more. Signature,
//! payload and chain validation require further context and live in
//! `entry::validate`.
use crate::entry::{DecodeEntryError, ENTRY_TAG, EncodedEntry, Entry, LogId, SeqNum};
use crate::hash::{YAMF_HASH_LEN, YamfHash};
use crate::identity::{Author, PUBLIC_KEY_LEN, SIGNATURE_LEN, Signature};

/// Decodes canonical entry bytes into an `Entry` instance.
pub fn decode_entry(entry_encoded: &EncodedEntry) -> Result<Entry, DecodeEntryError> {
    let (entry, _) = decode_entry_remainder(entry_encoded.as_bytes())?;
    Ok(entry)
}

/// Decodes an entry from the front of the given bytes, additionally
/// returning how many bytes the canonical encoding consumed.
///
/// Interchange uses the consumed length to find the payload appended behind
/// the entry.
pub(crate) fn decode_entry_remainder(
    bytes: &[u8],
) -> Result<(Entry, usize), DecodeEntryError> {
    let mut parser = Parser::new(bytes);

    let tag = parser.take(1, "tag")?[0];
    if tag != ENTRY_TAG {
        return Err(DecodeEntryError::UnknownTag(tag));
    }

    let mut author = [0u8; PUBLIC_KEY_LEN];
    author.copy_from_slice(parser.take(PUBLIC_KEY_LEN, "author")?);
    let author = Author::from_bytes(author);

    let log_id = LogId::new(parser.varu64("log id")?);
    let seq_num =
        SeqNum::new(parser.varu64("sequence number")?).map_err(|_| DecodeEntryError::InvalidSeqNum)?;

    let lipmaa_link = if seq_num.is_lipmaa_required() {
        Some(YamfHash::from_encoded(
            parser.take(YAMF_HASH_LEN, "lipmaa link")?,
        )?)
    } else {
        None
    };

    let backlink = if seq_num.is_first() {
        None
    } else {
        Some(YamfHash::from_encoded(
            parser.take(YAMF_HASH_LEN, "backlink")?,
        )?)
    };

    let payload_size = parser.varu64("payload size")?;
    let payload_hash = YamfHash::from_encoded(parser.take(YAMF_HASH_LEN, "payload hash")?)?;

    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(parser.take(SIGNATURE_LEN, "signature")?);
    let signature = Signature::from_bytes(&signature);

    let entry = Entry {
        author,
        log_id,
        seq_num,
        lipmaa_link,
        backlink,
        payload_size,
        payload_hash,
        signature,
    };

    Ok((entry, parser.offset))
}

/// Cursor over the input bytes.
struct Parser<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodeEntryError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(DecodeEntryError::UnexpectedEof(field))?;

        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn varu64(&mut self, field: &'static str) -> Result<u64, DecodeEntryError> {
        match varu64::decode(&self.bytes[self.offset..]) {
            Ok((value, rest)) => {
                self.offset = self.bytes.len() - rest.len();
                Ok(value)
            }
            Err(_) => Err(DecodeEntryError::InvalidVarint(field)),
        }
    }
}
