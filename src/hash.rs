// SPDX-License-Identifier: MIT OR Apache-2.0

//! Yamf multihashes for entry links and payloads, plus the short digest used
//! for spool status reporting.
//!
//! All links and payload references are "yet another multi-format" hashes: a
//! BLAKE2b-512 digest prefixed with a tag byte naming the algorithm and a
//! length byte, 66 bytes on the wire in total.
use std::fmt;
use std::str::FromStr;

use blake2::digest::Digest;
use blake2::{Blake2b512, Blake2s256};
use thiserror::Error;

/// Size of the BLAKE2b digest carried inside a yamf hash.
pub const DIGEST_LEN: usize = 64;

/// Size of an encoded yamf hash: tag byte, length byte, digest.
pub const YAMF_HASH_LEN: usize = DIGEST_LEN + 2;

/// Size of the short digest used for spool status rows.
pub const SHORT_HASH_LEN: usize = 32;

/// Tag marking a BLAKE2b-512 digest in the yamf container format.
const BLAKE2B_TAG: u8 = 0x01;

/// 64-byte BLAKE2b hash in the yamf container format.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct YamfHash([u8; DIGEST_LEN]);

impl YamfHash {
    /// Calculate the hash of the provided bytes.
    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        let digest = Blake2b512::digest(buf.as_ref());
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Create a `YamfHash` from a raw digest.
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Digest bytes without the container header.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Encoded container bytes: tag, digest length, digest.
    pub fn to_encoded(&self) -> [u8; YAMF_HASH_LEN] {
        let mut encoded = [0u8; YAMF_HASH_LEN];
        encoded[0] = BLAKE2B_TAG;
        encoded[1] = DIGEST_LEN as u8;
        encoded[2..].copy_from_slice(&self.0);
        encoded
    }

    /// Parses an encoded yamf container back into a hash.
    pub fn from_encoded(buf: &[u8]) -> Result<Self, HashError> {
        if buf.len() != YAMF_HASH_LEN {
            return Err(HashError::InvalidLength(buf.len(), YAMF_HASH_LEN));
        }

        if buf[0] != BLAKE2B_TAG {
            return Err(HashError::UnknownFormat(buf[0]));
        }

        if buf[1] as usize != DIGEST_LEN {
            return Err(HashError::UnknownFormat(buf[1]));
        }

        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&buf[2..]);
        Ok(Self(bytes))
    }

    /// Convert the encoded hash to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_encoded())
    }
}

impl fmt::Display for YamfHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for YamfHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("YamfHash").field(&self.to_hex()).finish()
    }
}

impl TryFrom<&[u8]> for YamfHash {
    type Error = HashError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_encoded(value)
    }
}

impl FromStr for YamfHash {
    type Err = HashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_encoded(&hex::decode(value)?)
    }
}

/// Short digest over a canonical table stream, reported Base62-encoded in
/// spool status rows.
pub fn short_hash(buf: impl AsRef<[u8]>) -> [u8; SHORT_HASH_LEN] {
    let digest = Blake2s256::digest(buf.as_ref());
    let mut bytes = [0u8; SHORT_HASH_LEN];
    bytes.copy_from_slice(&digest);
    bytes
}

/// Error types for `YamfHash` struct.
#[derive(Error, Debug)]
pub enum HashError {
    /// Encoded hash has an invalid length.
    #[error("invalid hash length {0} bytes, expected {1} bytes")]
    InvalidLength(usize, usize),

    /// Encoded hash does not carry a BLAKE2b-512 digest.
    #[error("unknown hash container byte {0:#04x}")]
    UnknownFormat(u8),

    /// Hash string contains invalid hexadecimal characters.
    #[error("invalid hex encoding in hash string")]
    InvalidHexEncoding(#[from] hex::FromHexError),
}
