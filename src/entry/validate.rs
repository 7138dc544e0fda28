// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collection of low-level validation methods for entries.
//!
//! Signature and payload checks are self-contained; chain checks need access
//! to the canonical bytes of predecessor entries and are therefore driven by
//! a lookup function. A predecessor which is not available locally defers
//! verification of that edge instead of failing it; the entry is accepted
//! but its certificate path stays incomplete until the gap is filled.
use crate::entry::{EncodedEntry, Entry, SeqNum, ValidateEntryError};
use crate::hash::YamfHash;

/// Checks if backlink and lipmaa link are correctly set for the given
/// sequence number.
///
/// First entries do not contain any links. Every other entry has to contain
/// a backlink, and a lipmaa link exactly where it would differ from the
/// backlink.
pub fn validate_links(entry: &Entry) -> Result<(), ValidateEntryError> {
    match (
        entry.seq_num().is_first(),
        entry.backlink().is_some(),
        entry.lipmaa_link().is_some(),
        entry.is_lipmaa_required(),
    ) {
        (true, false, false, false) => Ok(()),
        (false, true, false, false) => Ok(()),
        (false, true, true, true) => Ok(()),
        (_, _, _, _) => Err(ValidateEntryError::InvalidLinks),
    }?;

    if entry.is_lipmaa_required() && entry.backlink() == entry.lipmaa_link() {
        return Err(ValidateEntryError::BacklinkAndLipmaaLinkIdentical);
    }

    Ok(())
}

/// Checks if the entry is authentic by verifying its signature against the
/// claimed author.
///
/// The signed preimage is the canonical encoding with the signature field
/// zero-filled.
pub fn validate_signature(
    entry: &Entry,
    encoded_entry: &EncodedEntry,
) -> Result<(), ValidateEntryError> {
    if !entry
        .author()
        .verify(&encoded_entry.signable_bytes(), entry.signature())
    {
        return Err(ValidateEntryError::InvalidSignature);
    }

    Ok(())
}

/// Checks if the claimed payload hash and size match the actual data.
pub fn validate_payload(entry: &Entry, payload: &[u8]) -> Result<(), ValidateEntryError> {
    if entry.payload_hash() != &YamfHash::new(payload) {
        return Err(ValidateEntryError::PayloadHashMismatch);
    }

    if entry.payload_size() != payload.len() as u64 {
        return Err(ValidateEntryError::PayloadSizeMismatch);
    }

    Ok(())
}

/// Checks the claimed link hashes against the canonical bytes of locally
/// available predecessor entries.
///
/// `lookup` returns the canonical bytes of the entry at the given sequence
/// number in the same log, or `None` when it is not stored. Missing
/// predecessors defer verification of that edge.
pub fn validate_chain<F>(entry: &Entry, lookup: F) -> Result<(), ValidateEntryError>
where
    F: Fn(SeqNum) -> Option<Vec<u8>>,
{
    if let (Some(claimed), Some(seq_num)) =
        (entry.backlink(), entry.seq_num().backlink_seq_num())
    {
        if let Some(bytes) = lookup(seq_num) {
            if &YamfHash::new(&bytes) != claimed {
                return Err(ValidateEntryError::BacklinkMismatch);
            }
        }
    }

    if entry.is_lipmaa_required() {
        if let (Some(claimed), Some(seq_num)) =
            (entry.lipmaa_link(), entry.seq_num().lipmaa_seq_num())
        {
            if let Some(bytes) = lookup(seq_num) {
                if &YamfHash::new(&bytes) != claimed {
                    return Err(ValidateEntryError::LipmaaLinkMismatch);
                }
            }
        }
    }

    Ok(())
}
