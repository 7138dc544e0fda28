// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ed25519 key pairs, authors and signatures.
//!
//! The `KeyPair` signs entries, the `Author` is the 32-byte public half
//! embedded in every entry and identified towards users by its Base62
//! encoding. Key pairs are kept in the spool's identity table under a local
//! alias; resolution of user-supplied author references happens in the store
//! (see `Store::as_base62`).
use std::fmt;
use std::str::FromStr;

use ed25519_dalek::Signer;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::base62;

/// The length of an Ed25519 `Signature`, in bytes.
pub const SIGNATURE_LEN: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// The length of an Ed25519 secret key, in bytes.
pub const SECRET_KEY_LEN: usize = ed25519_dalek::SECRET_KEY_LENGTH;

/// The length of an Ed25519 public key, in bytes.
pub const PUBLIC_KEY_LEN: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

/// Ed25519 key pair signing entries on behalf of a stored identity.
#[derive(Clone)]
pub struct KeyPair(ed25519_dalek::SigningKey);

impl KeyPair {
    /// Generates a new key pair using the system's random number generator
    /// (CSPRNG) as a seed.
    pub fn new() -> Self {
        let mut csprng: OsRng = OsRng;
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Derives a key pair from the raw bytes of its secret half.
    pub fn from_secret_key(bytes: &[u8; SECRET_KEY_LEN]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(bytes))
    }

    /// Bytes of the secret half.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LEN] {
        self.0.to_bytes()
    }

    /// Public half of the key pair.
    pub fn public_key(&self) -> Author {
        Author(self.0.verifying_key().to_bytes())
    }

    /// Sign the provided bytestring using this key pair.
    pub fn sign(&self, bytes: &[u8]) -> Signature {
        Signature(self.0.sign(bytes))
    }
}

impl Default for KeyPair {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyPair").field(&self.public_key()).finish()
    }
}

/// Public Ed25519 key identifying the writer of a log.
///
/// Authors are carried as raw bytes; whether they name a valid curve point
/// is only decided during signature verification, so entries from foreign
/// stores can be decoded and inspected before being rejected.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Author([u8; PUBLIC_KEY_LEN]);

impl Author {
    /// Create an `Author` from its raw bytes representation.
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Bytes of the public key.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Canonical Base62 identifier of this author, always 43 characters.
    pub fn to_base62(&self) -> String {
        base62::encode(&self.0)
    }

    /// Parses a canonical Base62 identifier.
    pub fn from_base62(value: &str) -> Result<Self, IdentityError> {
        Ok(Self(base62::decode(value)?))
    }

    /// Verify a signature over a byte slice with this public key.
    ///
    /// Returns false when the key bytes are not a valid curve point.
    pub fn verify(&self, bytes: &[u8], signature: &Signature) -> bool {
        match ed25519_dalek::VerifyingKey::from_bytes(&self.0) {
            Ok(key) => key.verify_strict(bytes, &signature.0).is_ok(),
            Err(_) => false,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base62())
    }
}

impl fmt::Debug for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Author").field(&self.to_base62()).finish()
    }
}

impl TryFrom<&[u8]> for Author {
    type Error = IdentityError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let value_len = value.len();

        let checked_value: [u8; PUBLIC_KEY_LEN] = value
            .try_into()
            .map_err(|_| IdentityError::InvalidLength(value_len, PUBLIC_KEY_LEN))?;

        Ok(Self(checked_value))
    }
}

impl FromStr for Author {
    type Err = IdentityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_base62(value)
    }
}

/// Ed25519 signature over the canonical entry bytes with the signature field
/// zero-filled.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    /// Create a `Signature` from its raw bytes representation.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(bytes))
    }

    /// Bytes of the signature.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0.to_bytes()
    }

    /// Convert the signature to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_hex()).finish()
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = IdentityError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let value_len = value.len();

        let checked_value: [u8; SIGNATURE_LEN] = value
            .try_into()
            .map_err(|_| IdentityError::InvalidLength(value_len, SIGNATURE_LEN))?;

        Ok(Self::from_bytes(&checked_value))
    }
}

/// Secret key material handed to `Store::create_identity`.
#[derive(Clone, Copy, Debug)]
pub enum Secret<'a> {
    /// Raw secret key bytes, must be exactly 32 bytes long.
    Raw(&'a [u8]),

    /// 43-character Base62 encoding of the secret key.
    Base62(&'a str),
}

impl Secret<'_> {
    /// Decodes the key material into secret key bytes.
    pub fn into_bytes(self) -> Result<[u8; SECRET_KEY_LEN], IdentityError> {
        match self {
            Secret::Raw(bytes) => {
                bytes.try_into().map_err(|_| {
                    IdentityError::InvalidLength(bytes.len(), SECRET_KEY_LEN)
                })
            }
            Secret::Base62(value) => Ok(base62::decode(value)?),
        }
    }
}

/// Selects which half of a stored key pair to return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyHalf {
    /// The secret signing key.
    Secret,

    /// The public verifying key.
    Public,
}

/// Error types for identities and their resolution.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Invalid number of bytes.
    #[error("invalid bytes length of {0}, expected {1} bytes")]
    InvalidLength(usize, usize),

    /// Identifier is not canonical Base62.
    #[error(transparent)]
    InvalidIdentifier(#[from] base62::Base62Error),

    /// Alias, prefix or key does not resolve to a known identity.
    #[error("unknown identity {0:?}")]
    UnknownIdentity(String),

    /// Arguments do not form valid identity material.
    #[error("improper identity arguments: {0}")]
    ImproperArguments(&'static str),
}

#[cfg(test)]
mod tests {
    use crate::base62;

    use super::{Author, KeyPair, Secret};

    #[test]
    fn signing() {
        let key_pair = KeyPair::new();
        let public_key = key_pair.public_key();
        let bytes = b"test";
        let signature = key_pair.sign(bytes);
        assert!(public_key.verify(bytes, &signature));

        // Invalid data
        assert!(!public_key.verify(b"not test", &signature));

        // Invalid public key
        let public_key_2 = KeyPair::new().public_key();
        assert!(!public_key_2.verify(bytes, &signature));
    }

    #[test]
    fn key_pair_from_secret_key() {
        let key_pair = KeyPair::new();
        let key_pair_2 = KeyPair::from_secret_key(&key_pair.secret_key_bytes());
        assert_eq!(key_pair.public_key(), key_pair_2.public_key());
    }

    #[test]
    fn canonical_identifier() {
        let author = KeyPair::new().public_key();
        let encoded = author.to_base62();

        assert_eq!(encoded.len(), base62::ENCODED_KEY_LEN);
        assert_eq!(Author::from_base62(&encoded).unwrap(), author);
        assert_eq!(encoded.parse::<Author>().unwrap(), author);
    }

    #[test]
    fn secret_material() {
        let key_pair = KeyPair::new();
        let secret = key_pair.secret_key_bytes();

        let from_raw = Secret::Raw(&secret).into_bytes().unwrap();
        assert_eq!(from_raw, secret);

        let encoded = base62::encode(&secret);
        let from_base62 = Secret::Base62(&encoded).into_bytes().unwrap();
        assert_eq!(from_base62, secret);

        assert!(Secret::Raw(&secret[..16]).into_bytes().is_err());
        assert!(Secret::Base62("not base62").into_bytes().is_err());
    }
}
