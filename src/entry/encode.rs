// SPDX-License-Identifier: MIT OR Apache-2.0

//! Methods to sign and encode an entry.
//!
//! `sign_entry` takes the entry arguments, the payload and a `KeyPair` and
//! returns a signed `Entry`; `encode_entry` produces the canonical bytes
//! which are hashed for the links of later entries.
//!
//! ```text
//! ┌─────┐                     ┌────────────┐
//! │Entry│ ──encode_entry()──► │EncodedEntry│ ─────► bytes
//! └─────┘                     └────────────┘
//! ```
use crate::entry::validate::validate_links;
use crate::entry::{ENTRY_TAG, EncodeEntryError, EncodedEntry, Entry, LogId, SeqNum};
use crate::hash::YamfHash;
use crate::identity::{KeyPair, SIGNATURE_LEN, Signature};

/// Largest accepted payload, in bytes.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Takes entry arguments (log id, sequence number, link hashes), the payload
/// and a [`KeyPair`], returns a signed `Entry` instance.
///
/// The signature covers the canonical encoding with the signature field
/// zero-filled. This applies only basic checks that the backlink and lipmaa
/// link are correctly set for the given sequence number; it does not check
/// log integrity against other entries.
pub fn sign_entry(
    log_id: &LogId,
    seq_num: &SeqNum,
    lipmaa_link: Option<&YamfHash>,
    backlink: Option<&YamfHash>,
    payload: &[u8],
    key_pair: &KeyPair,
) -> Result<Entry, EncodeEntryError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(EncodeEntryError::PayloadTooLarge(
            payload.len(),
            MAX_PAYLOAD_SIZE,
        ));
    }

    // Omit the lipmaa link when it would equal the backlink, this saves us
    // some bytes.
    let lipmaa_link = if seq_num.is_lipmaa_required() {
        lipmaa_link.copied()
    } else {
        None
    };

    let mut entry = Entry {
        author: key_pair.public_key(),
        log_id: *log_id,
        seq_num: *seq_num,
        lipmaa_link,
        backlink: backlink.copied(),
        payload_size: payload.len() as u64,
        payload_hash: YamfHash::new(payload),
        signature: Signature::from_bytes(&[0u8; SIGNATURE_LEN]),
    };

    // The preimage is the canonical encoding carrying the zero-filled
    // signature set above; encoding also checks the links.
    let preimage = encode_entry(&entry)?;
    entry.signature = key_pair.sign(preimage.as_bytes());

    Ok(entry)
}

/// Encodes an entry into its canonical bytes and returns them as
/// `EncodedEntry` instance.
///
/// Optional links are simply absent from the byte stream. This method only
/// fails if backlink and lipmaa link are not valid for the entry's sequence
/// number.
pub fn encode_entry(entry: &Entry) -> Result<EncodedEntry, EncodeEntryError> {
    validate_links(entry)?;

    let mut bytes = Vec::with_capacity(256);

    bytes.push(ENTRY_TAG);
    bytes.extend_from_slice(entry.author.as_bytes());
    push_varu64(&mut bytes, entry.log_id.as_u64());
    push_varu64(&mut bytes, entry.seq_num.as_u64());

    if let Some(link) = &entry.lipmaa_link {
        bytes.extend_from_slice(&link.to_encoded());
    }

    if let Some(link) = &entry.backlink {
        bytes.extend_from_slice(&link.to_encoded());
    }

    push_varu64(&mut bytes, entry.payload_size);
    bytes.extend_from_slice(&entry.payload_hash.to_encoded());
    bytes.extend_from_slice(&entry.signature.to_bytes());

    Ok(EncodedEntry::from_bytes(&bytes))
}

fn push_varu64(buf: &mut Vec<u8>, value: u64) {
    // Longest varu64 encoding is 9 bytes.
    let mut out = [0u8; 9];
    let length = varu64::encode(value, &mut out);
    buf.extend_from_slice(&out[..length]);
}
