// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use crate::Validate;
use crate::entry::SeqNumError;
use crate::lipmaa::{is_lipmaa_required, lipmaa};

/// Start counting entries from here.
pub const FIRST_SEQ_NUM: u64 = 1;

/// Sequence number describing the position of an entry in its append-only
/// log.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Validates and wraps value into a new `SeqNum` instance.
    pub fn new(value: u64) -> Result<Self, SeqNumError> {
        let seq_num = Self(value);
        seq_num.validate()?;
        Ok(seq_num)
    }

    /// Return sequence number of the previous entry (backlink).
    pub fn backlink_seq_num(&self) -> Option<Self> {
        if self.is_first() {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }

    /// Return sequence number of the entry this one skip-links to.
    pub fn lipmaa_seq_num(&self) -> Option<Self> {
        if self.is_first() {
            None
        } else {
            Some(Self(lipmaa(self.0)))
        }
    }

    /// Returns true when the entry carries a dedicated lipmaa link next to
    /// its backlink.
    pub fn is_lipmaa_required(&self) -> bool {
        is_lipmaa_required(self.0)
    }

    /// Returns true when sequence number marks first entry in log.
    pub fn is_first(&self) -> bool {
        self.0 == FIRST_SEQ_NUM
    }

    /// Returns `SeqNum` as u64 integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(FIRST_SEQ_NUM)
    }
}

impl Validate for SeqNum {
    type Error = SeqNumError;

    fn validate(&self) -> Result<(), Self::Error> {
        // Numbers have to be larger than zero
        if self.0 < FIRST_SEQ_NUM {
            return Err(SeqNumError::NotZeroOrNegative);
        }

        Ok(())
    }
}

impl TryFrom<u64> for SeqNum {
    type Error = SeqNumError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for SeqNum {
    type Err = SeqNumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(u64::from_str(value).map_err(|_| SeqNumError::InvalidU64String)?)
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
