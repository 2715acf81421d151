//! # Regulator Administration
//!
//! Certifier assignment and auditor accreditation. Every operation here
//! requires the regulator.

use hycred_core::AccountId;
use hycred_state::{Auditor, AuditorError};

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::registry::{Change, CreditRegistry, Staged};
use crate::roles::Role;

impl CreditRegistry {
    /// Hand the certifier role to `certifier`. The regulator keeps its own
    /// right to issue.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is the regulator.
    pub fn set_certifier(
        &self,
        caller: &AccountId,
        certifier: AccountId,
    ) -> Result<(), RegistryError> {
        let previous = self.apply("set certifier", caller, |state, _now| {
            state.require(caller, Role::Regulator, "set certifier")?;
            let previous = state.roles.certifier().clone();
            let staged = Staged::default()
                .change(Change::SetCertifier(certifier.clone()))
                .event(RegistryEvent::CertifierUpdated {
                    previous: previous.clone(),
                    current: certifier.clone(),
                });
            Ok((previous, staged))
        })?;
        tracing::info!(previous = %previous, certifier = %certifier, "certifier updated");
        Ok(())
    }

    /// Accredit a new, active auditor with no verifications.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is the regulator;
    /// `InvalidStateTransition` if the identity already has a record.
    pub fn register_auditor(
        &self,
        caller: &AccountId,
        auditor: AccountId,
        name: &str,
        accreditation: &str,
    ) -> Result<(), RegistryError> {
        self.apply("register auditor", caller, |state, now| {
            state.require(caller, Role::Regulator, "register auditor")?;
            if state.auditors.contains(&auditor) {
                return Err(AuditorError::AlreadyRegistered(auditor.clone()).into());
            }
            let record = Auditor::register(
                auditor.clone(),
                name.to_string(),
                accreditation.to_string(),
                now,
            );
            let staged = Staged::default()
                .change(Change::PutAuditor(record))
                .event(RegistryEvent::AuditorRegistered {
                    auditor: auditor.clone(),
                    name: name.to_string(),
                });
            Ok(((), staged))
        })?;
        tracing::info!(auditor = %auditor, name, "auditor registered");
        Ok(())
    }

    /// Soft-delete an auditor. The record and its counters remain queryable.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` unless `caller` is the regulator;
    /// `InvalidStateTransition` if the identity is not a registered auditor
    /// or is already inactive.
    pub fn deactivate_auditor(
        &self,
        caller: &AccountId,
        auditor: &AccountId,
    ) -> Result<(), RegistryError> {
        self.apply("deactivate auditor", caller, |state, now| {
            state.require(caller, Role::Regulator, "deactivate auditor")?;
            let mut record = state
                .auditors
                .get(auditor)
                .cloned()
                .ok_or_else(|| AuditorError::NotRegistered(auditor.clone()))?;
            record.deactivate(now)?;
            let staged = Staged::default()
                .change(Change::PutAuditor(record))
                .event(RegistryEvent::AuditorDeactivated {
                    auditor: auditor.clone(),
                });
            Ok(((), staged))
        })?;
        tracing::info!(auditor = %auditor, "auditor deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{CreditRegistry, CreditTerms, ErrorKind, RegistryConfig};
    use hycred_core::AccountId;

    fn acct(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn registry() -> CreditRegistry {
        CreditRegistry::new(acct("reg"), RegistryConfig::default()).unwrap()
    }

    fn terms(reg: &CreditRegistry) -> CreditTerms {
        CreditTerms {
            owner: acct("p"),
            producer: acct("p"),
            producer_name: "P".into(),
            amount: 5,
            production_date: reg.now(),
            renewable_source: "wind".into(),
            location: "L".into(),
            carbon_intensity: 10,
            metadata: String::new(),
        }
    }

    #[test]
    fn only_regulator_sets_certifier() {
        let reg = registry();
        let err = reg.set_certifier(&acct("mallory"), acct("mallory")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(reg.certifier(), acct("reg"));

        reg.set_certifier(&acct("reg"), acct("cert")).unwrap();
        assert_eq!(reg.certifier(), acct("cert"));
        // The new certifier is not a regulator.
        assert_eq!(
            reg.set_certifier(&acct("cert"), acct("other")).unwrap_err().kind(),
            ErrorKind::PermissionDenied
        );
        reg.issue_credit(&acct("cert"), terms(&reg)).unwrap();

        reg.set_certifier(&acct("reg"), acct("cert-2")).unwrap();
        assert_eq!(
            reg.issue_credit(&acct("cert"), terms(&reg)).unwrap_err().kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(reg.credit_count(), 1);
        reg.issue_credit(&acct("cert-2"), terms(&reg)).unwrap();
        reg.issue_credit(&acct("reg"), terms(&reg)).unwrap();
        assert_eq!(reg.credit_count(), 3);
    }

    #[test]
    fn register_then_duplicate() {
        let reg = registry();
        reg.register_auditor(&acct("reg"), acct("aud"), "Auditor A", "ACC-1")
            .unwrap();
        let a = reg.get_auditor(&acct("aud")).unwrap();
        assert!(a.active);
        assert_eq!(a.verification_count, 0);
        assert_eq!(a.accreditation, "ACC-1");

        let err = reg
            .register_auditor(&acct("reg"), acct("aud"), "Again", "ACC-2")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStateTransition);
        assert_eq!(reg.get_auditor(&acct("aud")).unwrap().name, "Auditor A");
    }

    #[test]
    fn non_regulator_cannot_register() {
        let reg = registry();
        reg.register_auditor(&acct("reg"), acct("aud"), "A", "X").unwrap();
        let err = reg
            .register_auditor(&acct("aud"), acct("friend"), "B", "Y")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(reg.get_auditor(&acct("friend")).is_err());
    }

    #[test]
    fn deactivation_keeps_record() {
        let reg = registry();
        reg.register_auditor(&acct("reg"), acct("aud"), "A", "X").unwrap();
        reg.deactivate_auditor(&acct("reg"), &acct("aud")).unwrap();
        assert!(!reg.is_active_auditor(&acct("aud")));
        let record = reg.get_auditor(&acct("aud")).unwrap();
        assert!(!record.active);
        assert!(record.deactivated_at.is_some());
        assert_eq!(reg.auditors().len(), 1);

        assert_eq!(
            reg.deactivate_auditor(&acct("reg"), &acct("aud")).unwrap_err().kind(),
            ErrorKind::InvalidStateTransition
        );
    }

    #[test]
    fn deactivating_unknown_identity_fails() {
        let reg = registry();
        assert_eq!(
            reg.deactivate_auditor(&acct("reg"), &acct("ghost")).unwrap_err().kind(),
            ErrorKind::InvalidStateTransition
        );
        assert!(reg.notifications().is_empty());
    }
}
