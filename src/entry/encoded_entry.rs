// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::hash::Hash as StdHash;

use crate::hash::YamfHash;
use crate::identity::SIGNATURE_LEN;

/// Wrapper type for canonical entry bytes.
///
/// No validation is applied here; use `decode_entry` to run all checks and
/// get an `Entry` instance. The signature is the trailing 64 bytes of the
/// canonical form, which is why the signed preimage can be derived directly
/// from the encoded bytes.
#[derive(Clone, Debug, PartialEq, Eq, StdHash)]
pub struct EncodedEntry(Vec<u8>);

impl EncodedEntry {
    /// Returns new `EncodedEntry` instance from given bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_owned())
    }

    /// Returns entry bytes as slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns entry bytes as owned vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the number of canonical bytes.
    pub fn size(&self) -> u64 {
        self.0.len() as u64
    }

    /// Generates and returns hash of the encoded entry.
    ///
    /// This is the value link fields of later entries carry.
    pub fn hash(&self) -> YamfHash {
        YamfHash::new(&self.0)
    }

    /// Returns the signed preimage: the canonical bytes with the signature
    /// field zero-filled.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut bytes = self.0.clone();
        let signature_start = bytes.len().saturating_sub(SIGNATURE_LEN);
        for byte in &mut bytes[signature_start..] {
            *byte = 0;
        }
        bytes
    }
}

impl fmt::Display for EncodedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}
