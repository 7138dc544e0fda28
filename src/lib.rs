// SPDX-License-Identifier: MIT OR Apache-2.0

//! # baobab
//!
//! A local store and verifier for [`Bamboo`] append-only logs. Entries are
//! organised in per-author, per-log single-writer logs, signed with Ed25519
//! and chained by hash both to their immediate predecessor (backlink) and to
//! a skip-link position (the lipmaa link), which keeps verification paths
//! back to the log root logarithmic in length.
//!
//! The spool lives in an embedded [`sled`] database and is partitioned into
//! named clumps; identities (key pairs under a local alias) are global to the
//! spool. All operations run against a [`Store`] handle:
//!
//! ```
//! use baobab::{Options, Store};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let tmp = tempfile::tempdir()?;
//! let store = Store::open(tmp.path())?;
//! store.create_identity("ada", None)?;
//!
//! let entry = store.append(b"An entry for testing", "ada", &Options::default())?;
//! assert_eq!(entry.seq_num().as_u64(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! [`Bamboo`]: https://github.com/AljoschaMeyer/bamboo
#![warn(
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

pub mod base62;
pub mod entry;
pub mod hash;
pub mod identity;
pub mod lipmaa;
pub mod store;

pub use entry::{EncodedEntry, Entry, LogId, SeqNum};
pub use hash::YamfHash;
pub use identity::{Author, KeyPair, Secret, Signature};
pub use store::{Fetched, Format, Options, Scope, Store, StoreError, Table};

/// Trait used by baobab structs to validate data formats.
///
/// Use this trait to check against canonic formats of data (like sequence
/// numbers or encoded hashes) coming in via deserialization, constructors or
/// string conversion.
pub trait Validate {
    /// Validation error type.
    type Error: std::fmt::Debug + std::error::Error + Send + Sync + 'static;

    /// Validates a baobab data type instance.
    fn validate(&self) -> Result<(), Self::Error>;
}

/// Init pretty_env_logger before the test suite runs to handle logging
/// outputs.
///
/// Log information is emitted with the `log` crate. Set eg.
/// `RUST_LOG=baobab=debug cargo t` to see it while running the tests.
#[cfg(test)]
#[ctor::ctor]
fn init() {
    // If the `RUST_LOG` env var is not set skip initiation as we don't want
    // to see any logs.
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init();
    }
}
