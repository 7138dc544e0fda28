// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use crate::entry::LogIdError;

/// Authors can write to multiple logs identified by this per-author
/// discriminator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct LogId(u64);

impl LogId {
    /// Returns a new `LogId` instance.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns `LogId` as u64 integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for LogId {
    type Err = LogIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            u64::from_str(value).map_err(|_| LogIdError::InvalidU64String)?,
        ))
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
