//! # Identity & Role Directory
//!
//! Answers "what may this caller do?" for every operation. The regulator is
//! fixed at construction and is also the first certifier. Auditor status
//! comes from the auditor book, so deactivating an auditor revokes the role
//! immediately.

use serde::{Deserialize, Serialize};

use hycred_core::AccountId;

use crate::books::AuditorBook;

/// A role an operation can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Top-level administrator; sole grantor of other roles.
    Regulator,
    /// Authorized to issue credits.
    Certifier,
    /// Registered auditor whose record is active.
    ActiveAuditor,
    /// Current owner of the credit being acted on.
    Owner,
}

impl Role {
    /// Snake-case role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regulator => "regulator",
            Self::Certifier => "certifier",
            Self::ActiveAuditor => "active_auditor",
            Self::Owner => "owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holders of the two singleton roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDirectory {
    regulator: AccountId,
    certifier: AccountId,
}

/// Everything the directory knows about one caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallerRoles {
    pub regulator: bool,
    pub certifier: bool,
    /// `Some(active)` if the caller has an auditor record.
    pub auditor: Option<bool>,
}

impl CallerRoles {
    /// Whether the caller holds `role`. `Owner` is per-credit and never held here.
    pub fn holds(&self, role: Role) -> bool {
        match role {
            Role::Regulator => self.regulator,
            Role::Certifier => self.certifier,
            Role::ActiveAuditor => self.auditor == Some(true),
            Role::Owner => false,
        }
    }

    /// Certifier or regulator: the two roles allowed to issue.
    pub fn can_issue(&self) -> bool {
        self.certifier || self.regulator
    }
}

impl RoleDirectory {
    /// A directory where `regulator` is also the certifier.
    pub fn new(regulator: AccountId) -> Self {
        Self {
            certifier: regulator.clone(),
            regulator,
        }
    }

    /// The regulator identity.
    pub fn regulator(&self) -> &AccountId {
        &self.regulator
    }

    /// The current certifier identity.
    pub fn certifier(&self) -> &AccountId {
        &self.certifier
    }

    /// Replace the certifier, returning the previous holder.
    pub(crate) fn replace_certifier(&mut self, certifier: AccountId) -> AccountId {
        std::mem::replace(&mut self.certifier, certifier)
    }

    /// Resolve a caller against the directory and the auditor book.
    pub fn resolve(&self, caller: &AccountId, auditors: &AuditorBook) -> CallerRoles {
        CallerRoles {
            regulator: *caller == self.regulator,
            certifier: *caller == self.certifier,
            auditor: auditors.get(caller).map(|a| a.active),
        }
    }
}
