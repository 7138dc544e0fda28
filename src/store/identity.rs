// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity registry: locally stored key pairs under user-chosen aliases.
//!
//! Identities are global to the spool, not clump-scoped. The canonical
//! public identifier is the 43-character Base62 encoding of the public key;
//! `as_base62` resolves every accepted author reference form onto it.
use serde_bytes::ByteBuf;

use crate::base62;
use crate::identity::{Author, IdentityError, KeyHalf, KeyPair, PUBLIC_KEY_LEN, Secret};
use crate::store::spool::{IdentityRow, decode_value, encode_value};
use crate::store::{Store, StoreError, Table};

impl Store {
    /// Creates (or overwrites) the identity stored under `alias` and returns
    /// its canonical Base62 identifier.
    ///
    /// The secret half is taken from the given key material, or drawn from
    /// the system's random number generator when omitted. Creating the same
    /// alias twice from the same secret yields the same identifier.
    pub fn create_identity(
        &self,
        alias: &str,
        secret: Option<Secret<'_>>,
    ) -> Result<String, StoreError> {
        valid_alias(alias)?;

        let key_pair = match secret {
            Some(material) => KeyPair::from_secret_key(&material.into_bytes()?),
            None => KeyPair::new(),
        };
        let author = key_pair.public_key();

        let row = IdentityRow {
            secret: ByteBuf::from(key_pair.secret_key_bytes().to_vec()),
            public: ByteBuf::from(author.as_bytes().to_vec()),
        };
        self.identity_tree()?.insert(alias, encode_value(&row)?)?;
        self.invalidate_status(Table::Identity, "")?;

        log::debug!("created identity {:?} as {}", alias, author);
        Ok(author.to_base62())
    }

    /// Returns the raw bytes of one half of the key pair stored under
    /// `alias`.
    pub fn identity_key(&self, alias: &str, which: KeyHalf) -> Result<[u8; 32], StoreError> {
        let row = self.identity_row(alias)?;
        let half = match which {
            KeyHalf::Secret => row.secret,
            KeyHalf::Public => row.public,
        };

        half.into_vec()
            .try_into()
            .map_err(|_| StoreError::CorruptRow)
    }

    /// Lists all stored identities as `(alias, Base62 identifier)` pairs,
    /// sorted by alias.
    pub fn identities(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut identities = Vec::new();

        for item in self.identity_tree()?.iter() {
            let (alias, value) = item?;
            let alias = String::from_utf8(alias.to_vec()).map_err(|_| StoreError::CorruptRow)?;
            let row: IdentityRow = decode_value(&value)?;
            let public: [u8; PUBLIC_KEY_LEN] = row
                .public
                .into_vec()
                .try_into()
                .map_err(|_| StoreError::CorruptRow)?;
            identities.push((alias, base62::encode(&public)));
        }

        Ok(identities)
    }

    /// Moves the identity stored under `old` to the alias `new`.
    pub fn rename_identity(&self, old: &str, new: &str) -> Result<(), StoreError> {
        valid_alias(new)?;
        let row = self.identity_row(old)?;

        let tree = self.identity_tree()?;
        tree.insert(new, encode_value(&row)?)?;
        tree.remove(old)?;
        self.invalidate_status(Table::Identity, "")?;

        Ok(())
    }

    /// Removes the identity stored under `alias`.
    pub fn drop_identity(&self, alias: &str) -> Result<(), StoreError> {
        let dropped = self.identity_tree()?.remove(alias)?;
        if dropped.is_none() {
            return Err(IdentityError::UnknownIdentity(alias.to_owned()).into());
        }
        self.invalidate_status(Table::Identity, "")?;

        Ok(())
    }

    /// Resolves an author reference to its canonical Base62 identifier.
    ///
    /// Accepted forms: a `~prefix` matching exactly one stored identifier, a
    /// known alias, a 43-character Base62 identifier (returned as-is) and a
    /// raw 32-byte public key.
    pub fn as_base62(&self, reference: impl AsRef<[u8]>) -> Result<String, StoreError> {
        let bytes = reference.as_ref();

        if let Ok(text) = std::str::from_utf8(bytes) {
            if let Some(prefix) = text.strip_prefix('~') {
                return self.resolve_prefix(prefix);
            }

            if self.identity_tree()?.contains_key(text)? {
                let public = self.identity_key(text, KeyHalf::Public)?;
                return Ok(base62::encode(&public));
            }

            if text.len() == base62::ENCODED_KEY_LEN && base62::decode(text).is_ok() {
                return Ok(text.to_owned());
            }
        }

        if bytes.len() == PUBLIC_KEY_LEN {
            let key: [u8; PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| StoreError::CorruptRow)?;
            return Ok(base62::encode(&key));
        }

        Err(IdentityError::UnknownIdentity(String::from_utf8_lossy(bytes).into_owned()).into())
    }

    /// Resolves an author reference into an `Author`.
    pub(crate) fn resolve_author(&self, reference: impl AsRef<[u8]>) -> Result<Author, StoreError> {
        let identifier = self.as_base62(reference)?;
        let author = Author::from_base62(&identifier)?;
        Ok(author)
    }

    /// Key pair of the identity stored under `alias`, for signing.
    pub(crate) fn key_pair(&self, alias: &str) -> Result<KeyPair, StoreError> {
        let secret = self.identity_key(alias, KeyHalf::Secret)?;
        Ok(KeyPair::from_secret_key(&secret))
    }

    fn identity_row(&self, alias: &str) -> Result<IdentityRow, StoreError> {
        match self.identity_tree()?.get(alias)? {
            Some(bytes) => decode_value(&bytes),
            None => Err(IdentityError::UnknownIdentity(alias.to_owned()).into()),
        }
    }

    fn resolve_prefix(&self, prefix: &str) -> Result<String, StoreError> {
        let mut matches = Vec::new();
        for (_, identifier) in self.identities()? {
            if identifier.starts_with(prefix) {
                matches.push(identifier);
            }
        }
        // Two aliases may share a key pair.
        matches.sort();
        matches.dedup();

        match matches.as_slice() {
            [identifier] => Ok(identifier.clone()),
            _ => Err(IdentityError::UnknownIdentity(format!("~{prefix}")).into()),
        }
    }
}

fn valid_alias(alias: &str) -> Result<(), StoreError> {
    if alias.is_empty() {
        return Err(IdentityError::ImproperArguments("alias must not be empty").into());
    }

    // The sigil would make the alias unresolvable.
    if alias.starts_with('~') {
        return Err(IdentityError::ImproperArguments("alias must not start with '~'").into());
    }

    Ok(())
}
