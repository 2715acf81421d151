//! # Identifier Newtypes
//!
//! `AccountId` names a participant (regulator, certifier, auditor, producer,
//! owner). `CreditId` and `BatchId` are the two sequential registry counters.
//! Keeping them distinct types means a batch number can never be passed where
//! a credit number is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum byte length of an account identity.
pub const MAX_ACCOUNT_ID_LEN: usize = 256;

/// Identity of a registry participant.
///
/// Construction trims surrounding whitespace and rejects empty or oversized
/// values. Deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Validate and wrap an identity string.
    ///
    /// # Errors
    ///
    /// [`ValidationError::EmptyIdentity`] for blank input,
    /// [`ValidationError::IdentityTooLong`] above [`MAX_ACCOUNT_ID_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyIdentity);
        }
        if trimmed.len() > MAX_ACCOUNT_ID_LEN {
            return Err(ValidationError::IdentityTooLong {
                len: trimmed.len(),
                max: MAX_ACCOUNT_ID_LEN,
            });
        }
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Borrow the identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sequential credit identifier. The first issued credit is `1`.
///
/// `0` is never assigned, so looking it up always yields "not found".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CreditId(u64);

/// Sequential production batch identifier, counted independently of credits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct BatchId(u64);

macro_rules! sequential_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// The reserved "does not exist" value.
            pub const NONE: Self = Self(0);
            /// The first identifier handed out by a fresh registry.
            pub const FIRST: Self = Self(1);

            /// Wrap a raw value. Any `u64` is accepted; `0` simply never resolves.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// The raw numeric value.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Whether this is the reserved `0` sentinel.
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }

            /// The identifier that follows this one, or `None` on overflow.
            pub fn next(self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }
        }

        impl From<u64> for $ty {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

sequential_id!(CreditId, "credit");
sequential_id!(BatchId, "batch");
