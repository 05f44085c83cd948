// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store backing the service.
//!
//! Holds the credential table and the four clinical tables. Shared as
//! `Arc<RwLock<InMemoryStore>>` in [`crate::state::AppState`]; each method
//! below runs under one lock acquisition.

use std::collections::HashSet;

use crate::auth::policy::Visibility;
use crate::auth::Role;
use crate::models::{Appointment, Doctor, Patient, Prescription};
use crate::storage::{
    CredentialStore, NewUser, RecordStore, StoreError, StoreResult, Table, User, UserTable,
    UserUpdate,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub users: UserTable,
    pub doctors: Table<Doctor>,
    pub patients: Table<Patient>,
    pub appointments: Table<Appointment>,
    pub prescriptions: Table<Prescription>,
}

/// Row counts shown on the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub patients: usize,
    pub doctors: usize,
    pub appointments: usize,
    pub prescriptions: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a user, checking the doctor link against the doctors table.
    pub fn create_user(&mut self, fields: NewUser) -> StoreResult<User> {
        if fields.role == Role::Doctor {
            self.ensure_doctor_link(fields.linked_doctor_id.as_deref())?;
        }
        self.users.create(fields)
    }

    /// Update non-credential fields, checking a new doctor link.
    pub fn update_user(&mut self, id: &str, update: UserUpdate) -> StoreResult<User> {
        if let Some(link) = update.linked_doctor_id.as_deref() {
            let role = match update.role {
                Some(role) => role,
                None => self.users.find_by_id(id)?.role,
            };
            if role == Role::Doctor {
                self.ensure_doctor_link(Some(link))?;
            }
        }
        self.users.update_fields(id, update)
    }

    /// Field update plus an optional activation toggle, all or nothing.
    pub fn apply_user_changes(
        &mut self,
        id: &str,
        update: UserUpdate,
        is_active: Option<bool>,
    ) -> StoreResult<User> {
        let before = self.users.find_by_id(id)?;

        // Reactivation can conflict on the doctor link, so it goes first and
        // is rolled back if the field update fails.
        if is_active == Some(true) && !before.is_active {
            self.users.reactivate(id)?;
        }
        let updated = match self.update_user(id, update) {
            Ok(user) => user,
            Err(e) => {
                if !before.is_active {
                    self.users.deactivate(id)?;
                }
                return Err(e);
            }
        };
        if is_active == Some(false) && updated.is_active {
            return self.users.deactivate(id);
        }
        Ok(updated)
    }

    /// Create the bootstrap admin when no users exist yet.
    ///
    /// Returns `None` when the table already has users.
    pub fn seed_admin(
        &mut self,
        username: &str,
        email: &str,
        password_hash: String,
    ) -> StoreResult<Option<User>> {
        if !self.users.is_empty() {
            return Ok(None);
        }
        self.users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role: Role::Admin,
                linked_doctor_id: None,
            })
            .map(Some)
    }

    /// Delete a doctor profile. Refused while any account links to it, so a
    /// doctor account always points at an existing profile.
    pub fn remove_doctor(&mut self, id: &str) -> StoreResult<Doctor> {
        if self.users.links_doctor(id) {
            return Err(StoreError::Conflict(format!(
                "doctor {id} is linked to a user account"
            )));
        }
        self.doctors.remove(id)
    }

    /// Both references of an appointment or prescription must exist.
    pub fn ensure_references(&self, patient_id: &str, doctor_id: &str) -> StoreResult<()> {
        if !self.patients.contains(patient_id) {
            return Err(StoreError::Validation(format!("unknown patient: {patient_id}")));
        }
        if !self.doctors.contains(doctor_id) {
            return Err(StoreError::Validation(format!("unknown doctor: {doctor_id}")));
        }
        Ok(())
    }

    /// Patients the visibility may list. A scoped doctor sees patients that
    /// have at least one of their appointments or prescriptions.
    pub fn visible_patients(&self, visibility: &Visibility) -> Vec<Patient> {
        match visibility {
            Visibility::All => self.patients.filter(|_| true),
            Visibility::Nothing => Vec::new(),
            Visibility::Doctor(_) => {
                let ids = self.scoped_patient_ids(visibility);
                self.patients.filter(|p| ids.contains(p.id.as_str()))
            }
        }
    }

    /// Dashboard figures under `visibility`.
    pub fn counts(&self, visibility: &Visibility) -> Counts {
        match visibility {
            Visibility::All => Counts {
                patients: self.patients.len(),
                doctors: self.doctors.len(),
                appointments: self.appointments.len(),
                prescriptions: self.prescriptions.len(),
            },
            Visibility::Nothing => Counts::default(),
            Visibility::Doctor(_) => Counts {
                patients: self.scoped_patient_ids(visibility).len(),
                doctors: 1,
                appointments: self.appointments.count(|a| visibility.permits(&a.doctor_id)),
                prescriptions: self.prescriptions.count(|p| visibility.permits(&p.doctor_id)),
            },
        }
    }

    fn scoped_patient_ids(&self, visibility: &Visibility) -> HashSet<&str> {
        let mut ids = HashSet::new();
        for a in self.appointments.rows().filter(|a| visibility.permits(&a.doctor_id)) {
            ids.insert(a.patient_id.as_str());
        }
        for p in self.prescriptions.rows().filter(|p| visibility.permits(&p.doctor_id)) {
            ids.insert(p.patient_id.as_str());
        }
        ids
    }

    fn ensure_doctor_link(&self, linked_doctor_id: Option<&str>) -> StoreResult<()> {
        match linked_doctor_id {
            Some(id) if self.doctors.contains(id) => Ok(()),
            Some(id) if !id.trim().is_empty() => Err(StoreError::Validation(format!(
                "linked doctor does not exist: {id}"
            ))),
            // Missing link is reported by the user table.
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(id: &str) -> Doctor {
        Doctor {
            id: id.into(),
            first_name: "First".into(),
            last_name: id.into(),
            specialty: None,
            phone: None,
            address: None,
        }
    }

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.into(),
            first_name: "Pat".into(),
            last_name: id.into(),
            birth_date: None,
            sex: None,
            phone: None,
            address: None,
        }
    }

    fn appointment(id: &str, patient_id: &str, doctor_id: &str) -> Appointment {
        Appointment {
            id: id.into(),
            patient_id: patient_id.into(),
            doctor_id: doctor_id.into(),
            scheduled_at: None,
            reason: None,
        }
    }

    fn prescription(id: &str, patient_id: &str, doctor_id: &str) -> Prescription {
        Prescription {
            id: id.into(),
            patient_id: patient_id.into(),
            doctor_id: doctor_id.into(),
            medications: vec![],
            issued_on: None,
            instructions: None,
        }
    }

    fn seeded() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.doctors.insert(doctor("doc-a")).unwrap();
        store.doctors.insert(doctor("doc-b")).unwrap();
        for id in ["p1", "p2", "p3"] {
            store.patients.insert(patient(id)).unwrap();
        }
        store.appointments.insert(appointment("a1", "p1", "doc-a")).unwrap();
        store.appointments.insert(appointment("a2", "p2", "doc-b")).unwrap();
        store.prescriptions.insert(prescription("rx1", "p3", "doc-a")).unwrap();
        store.prescriptions.insert(prescription("rx2", "p2", "doc-b")).unwrap();
        store
    }

    fn doctor_user(username: &str, link: Option<&str>) -> NewUser {
        NewUser {
            username: username.into(),
            email: format!("{username}@clinic.example"),
            password_hash: "digest".into(),
            role: Role::Doctor,
            linked_doctor_id: link.map(str::to_string),
        }
    }

    #[test]
    fn create_user_requires_existing_doctor() {
        let mut store = seeded();
        assert!(store.create_user(doctor_user("drA", Some("doc-a"))).is_ok());
        assert!(matches!(
            store.create_user(doctor_user("drX", Some("doc-x"))),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.create_user(doctor_user("drN", None)),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn update_user_checks_new_link() {
        let mut store = seeded();
        let user = store.create_user(doctor_user("drA", Some("doc-a"))).unwrap();
        let bad = UserUpdate {
            linked_doctor_id: Some("doc-x".into()),
            ..Default::default()
        };
        assert!(matches!(store.update_user(&user.id, bad), Err(StoreError::Validation(_))));

        let good = UserUpdate {
            linked_doctor_id: Some("doc-b".into()),
            ..Default::default()
        };
        assert_eq!(
            store.update_user(&user.id, good).unwrap().linked_doctor_id.as_deref(),
            Some("doc-b")
        );
    }

    #[test]
    fn user_changes_are_all_or_nothing() {
        let mut store = seeded();
        let user = store.create_user(doctor_user("drA", Some("doc-a"))).unwrap();

        let off = store
            .apply_user_changes(&user.id, UserUpdate::default(), Some(false))
            .unwrap();
        assert!(!off.is_active);

        // Reactivating with a bad link leaves the account inactive.
        let bad = UserUpdate {
            linked_doctor_id: Some("doc-x".into()),
            ..Default::default()
        };
        assert!(store.apply_user_changes(&user.id, bad, Some(true)).is_err());
        assert!(!store.users.find_by_id(&user.id).unwrap().is_active);

        let on = store
            .apply_user_changes(
                &user.id,
                UserUpdate {
                    email: Some("dra@clinic.example".into()),
                    ..Default::default()
                },
                Some(true),
            )
            .unwrap();
        assert!(on.is_active);
        assert_eq!(on.email, "dra@clinic.example");
    }

    #[test]
    fn linked_doctor_cannot_be_removed() {
        let mut store = seeded();
        let user = store.create_user(doctor_user("drA", Some("doc-a"))).unwrap();
        assert!(matches!(store.remove_doctor("doc-a"), Err(StoreError::Conflict(_))));

        // Inactive accounts keep their link and still block removal.
        store.users.deactivate(&user.id).unwrap();
        assert!(matches!(store.remove_doctor("doc-a"), Err(StoreError::Conflict(_))));
        assert!(store.doctors.contains("doc-a"));

        store.users.delete(&user.id).unwrap();
        assert_eq!(store.remove_doctor("doc-a").unwrap().id, "doc-a");
        assert!(matches!(store.remove_doctor("doc-b"), Ok(_)));
        assert!(matches!(store.remove_doctor("doc-b"), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn seed_admin_only_on_empty_table() {
        let mut store = InMemoryStore::new();
        let admin = store.seed_admin("admin", "admin@clinic.example", "digest".into()).unwrap();
        assert_eq!(admin.map(|u| u.role), Some(Role::Admin));
        assert!(store.seed_admin("admin2", "a2@clinic.example", "digest".into()).unwrap().is_none());
        assert_eq!(store.users.len(), 1);
    }

    #[test]
    fn doctor_sees_patients_through_own_records() {
        let store = seeded();
        let ids: Vec<String> = store
            .visible_patients(&Visibility::Doctor("doc-a".into()))
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["p1", "p3"]);
        assert_eq!(store.visible_patients(&Visibility::All).len(), 3);
        assert!(store.visible_patients(&Visibility::Nothing).is_empty());
    }

    #[test]
    fn counts_follow_visibility() {
        let store = seeded();
        assert_eq!(
            store.counts(&Visibility::All),
            Counts { patients: 3, doctors: 2, appointments: 2, prescriptions: 2 }
        );
        assert_eq!(
            store.counts(&Visibility::Doctor("doc-b".into())),
            Counts { patients: 1, doctors: 1, appointments: 1, prescriptions: 1 }
        );
        assert_eq!(store.counts(&Visibility::Nothing), Counts::default());
    }

    #[test]
    fn references_must_exist() {
        let store = seeded();
        assert!(store.ensure_references("p1", "doc-a").is_ok());
        assert!(matches!(store.ensure_references("p9", "doc-a"), Err(StoreError::Validation(_))));
        assert!(matches!(store.ensure_references("p1", "doc-9"), Err(StoreError::Validation(_))));
    }
}
