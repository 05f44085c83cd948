// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Doctor ownership of clinical records.
//!
//! Records implementing [`DoctorScoped`] can be checked against the
//! identity's `linked_doctor_id` through the route's access descriptor.

use crate::auth::policy::ResourceKind;
use crate::models::{Appointment, Prescription};

/// A record owned by exactly one doctor.
pub trait DoctorScoped {
    const RESOURCE: ResourceKind;

    /// The owning doctor's id.
    fn owner_doctor_id(&self) -> &str;
}

impl DoctorScoped for Prescription {
    const RESOURCE: ResourceKind = ResourceKind::Prescription;

    fn owner_doctor_id(&self) -> &str {
        &self.doctor_id
    }
}

impl DoctorScoped for Appointment {
    const RESOURCE: ResourceKind = ResourceKind::Appointment;

    fn owner_doctor_id(&self) -> &str {
        &self.doctor_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::{authorize, Action, Decision, DenyReason, Resource};
    use crate::auth::{AuthenticatedUser, Role};

    fn prescription(doctor_id: &str) -> Prescription {
        Prescription {
            id: "rx-1".into(),
            patient_id: "p-1".into(),
            doctor_id: doctor_id.into(),
            medications: vec!["Aspirin".into()],
            issued_on: None,
            instructions: None,
        }
    }

    fn doctor_user(linked: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u-1".into(),
            username: "drA".into(),
            role: Role::Doctor,
            linked_doctor_id: Some(linked.into()),
        }
    }

    fn resource_of<R: DoctorScoped>(record: &R) -> Resource<'_> {
        Resource::owned_by(R::RESOURCE, record.owner_doctor_id())
    }

    #[test]
    fn prescription_owned_by_issuing_doctor() {
        let rx = prescription("doc-a");
        let resource = resource_of(&rx);
        assert_eq!(resource.kind, ResourceKind::Prescription);
        assert_eq!(resource.owner_doctor_id, Some("doc-a"));
    }

    #[test]
    fn owner_check_through_policy() {
        let me = doctor_user("doc-a");
        let mine = prescription("doc-a");
        let theirs = prescription("doc-b");
        assert_eq!(authorize(Some(&me), Action::Write, &resource_of(&mine)), Decision::Allow);
        assert_eq!(
            authorize(Some(&me), Action::Write, &resource_of(&theirs)),
            Decision::Deny(DenyReason::NotOwner)
        );
    }
}
