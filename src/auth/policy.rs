// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization policy.
//!
//! A pure decision function over (identity, action, resource). Every route
//! declares a [`RouteAccess`] taken from [`capability`], so the full policy
//! surface is the table in this file.
//!
//! Evaluation order: role first (`InsufficientRole`), then ownership for
//! doctor-scoped resources (`NotOwner`). Both must pass.

use serde::Serialize;

use super::{claims::AuthenticatedUser, roles::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    /// Create or replace.
    Write,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Patient,
    Doctor,
    Appointment,
    Prescription,
    Dashboard,
}

/// Where a route finds the owning doctor id of the resource it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerSource {
    /// The `{id}` path parameter is itself a doctor id (doctor profile).
    PathId,
    /// The handler loads the record and checks it through
    /// [`crate::storage::DoctorScoped`].
    Record,
}

/// Per-route capability descriptor: accepted roles plus an optional
/// ownership predicate applied to doctor-role identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteAccess {
    pub action: Action,
    pub resource: ResourceKind,
    pub required_roles: &'static [Role],
    pub ownership: Option<OwnerSource>,
}

impl RouteAccess {
    /// Any signed-in staff member, no resource scoping.
    pub const AUTHENTICATED: RouteAccess = RouteAccess {
        action: Action::Read,
        resource: ResourceKind::User,
        required_roles: &Role::ALL,
        ownership: None,
    };

    /// Admin only, whatever the resource.
    pub const fn admin(action: Action, resource: ResourceKind) -> Self {
        RouteAccess {
            action,
            resource,
            required_roles: &[Role::Admin],
            ownership: None,
        }
    }

    /// The same descriptor with the ownership predicate dropped. Used where
    /// the owner is not known yet (collections, record-sourced ownership).
    pub const fn role_only(self) -> Self {
        RouteAccess {
            ownership: None,
            ..self
        }
    }
}

/// Resource instance under evaluation. `owner_doctor_id` is `None` when the
/// route has no instance (collection routes) or the record has no owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource<'a> {
    pub kind: ResourceKind,
    pub owner_doctor_id: Option<&'a str>,
}

impl<'a> Resource<'a> {
    pub fn collection(kind: ResourceKind) -> Self {
        Self {
            kind,
            owner_doctor_id: None,
        }
    }

    pub fn owned_by(kind: ResourceKind, doctor_id: &'a str) -> Self {
        Self {
            kind,
            owner_doctor_id: Some(doctor_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Unauthenticated,
    InsufficientRole,
    NotOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

const STAFF: &[Role] = &[Role::Admin, Role::Doctor, Role::Receptionist];
const FRONT_DESK: &[Role] = &[Role::Admin, Role::Receptionist];
const CLINICAL: &[Role] = &[Role::Admin, Role::Doctor];
const ADMIN: &[Role] = &[Role::Admin];

/// The capability table.
pub const fn capability(action: Action, resource: ResourceKind) -> RouteAccess {
    let (required_roles, ownership) = match (resource, action) {
        (ResourceKind::User, _) => (ADMIN, None),

        (ResourceKind::Patient, Action::Read) => (STAFF, None),
        (ResourceKind::Patient, Action::Write | Action::Delete) => (FRONT_DESK, None),

        (ResourceKind::Doctor, Action::Read) => (STAFF, None),
        (ResourceKind::Doctor, Action::Write) => (STAFF, Some(OwnerSource::PathId)),
        // Doctors edit their own profile but never remove it.
        (ResourceKind::Doctor, Action::Delete) => (FRONT_DESK, None),

        (ResourceKind::Appointment, Action::Read) => (STAFF, Some(OwnerSource::Record)),
        (ResourceKind::Appointment, Action::Write | Action::Delete) => (FRONT_DESK, None),

        (ResourceKind::Prescription, Action::Read) => (STAFF, Some(OwnerSource::Record)),
        (ResourceKind::Prescription, Action::Write | Action::Delete) => (CLINICAL, Some(OwnerSource::Record)),

        (ResourceKind::Dashboard, Action::Read) => (CLINICAL, None),
        (ResourceKind::Dashboard, Action::Write | Action::Delete) => (ADMIN, None),
    };

    RouteAccess {
        action,
        resource,
        required_roles,
        ownership,
    }
}

/// Decide whether `identity` may perform `action` on `resource`.
pub fn authorize(identity: Option<&AuthenticatedUser>, action: Action, resource: &Resource<'_>) -> Decision {
    evaluate(identity, &capability(action, resource.kind), resource.owner_doctor_id)
}

/// Evaluate a route descriptor against an identity and, when the descriptor
/// is ownership-scoped, the resource's owning doctor id.
pub fn evaluate(identity: Option<&AuthenticatedUser>, access: &RouteAccess, owner_doctor_id: Option<&str>) -> Decision {
    let Some(identity) = identity else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if !identity.has_role(access.required_roles) {
        return Decision::Deny(DenyReason::InsufficientRole);
    }

    if access.ownership.is_some() && identity.role.is_doctor_scoped() {
        // Unlinked doctors and ownerless records fail closed.
        let owns = match (identity.linked_doctor_id.as_deref(), owner_doctor_id) {
            (Some(linked), Some(owner)) => linked == owner,
            _ => false,
        };
        if !owns {
            return Decision::Deny(DenyReason::NotOwner);
        }
    }

    Decision::Allow
}

/// Which rows of a collection an identity may list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    All,
    /// Only rows whose doctor reference equals this id.
    Doctor(String),
    Nothing,
}

impl Visibility {
    pub fn permits(&self, doctor_id: &str) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Doctor(own) => own == doctor_id,
            Visibility::Nothing => false,
        }
    }
}

/// Row filter for collection reads. Doctors see their own appointments,
/// prescriptions, patients and dashboard figures.
pub fn visibility(identity: &AuthenticatedUser, resource: ResourceKind) -> Visibility {
    let scoped = matches!(
        resource,
        ResourceKind::Appointment
            | ResourceKind::Prescription
            | ResourceKind::Patient
            | ResourceKind::Dashboard
    );
    if !scoped || !identity.role.is_doctor_scoped() {
        return Visibility::All;
    }

    match &identity.linked_doctor_id {
        Some(id) => Visibility::Doctor(id.clone()),
        None => Visibility::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, linked: Option<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: format!("{role}-user"),
            username: format!("{role}-name"),
            role,
            linked_doctor_id: linked.map(str::to_string),
        }
    }

    const ALL_ACTIONS: [Action; 3] = [Action::Read, Action::Write, Action::Delete];

    const ALL_KINDS: [ResourceKind; 6] = [
        ResourceKind::User,
        ResourceKind::Patient,
        ResourceKind::Doctor,
        ResourceKind::Appointment,
        ResourceKind::Prescription,
        ResourceKind::Dashboard,
    ];

    #[test]
    fn unauthenticated_is_denied_everywhere() {
        for kind in ALL_KINDS {
            for action in ALL_ACTIONS {
                assert_eq!(
                    authorize(None, action, &Resource::collection(kind)),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
            }
        }
    }

    #[test]
    fn admin_is_unrestricted() {
        let admin = user(Role::Admin, None);
        for kind in ALL_KINDS {
            for action in ALL_ACTIONS {
                assert!(authorize(Some(&admin), action, &Resource::owned_by(kind, "doc-x")).is_allowed());
                assert!(authorize(Some(&admin), action, &Resource::collection(kind)).is_allowed());
            }
        }
    }

    #[test]
    fn doctor_prescription_write_iff_owner() {
        let doctor = user(Role::Doctor, Some("doc-a"));
        for owner in ["doc-a", "doc-b", "doc-c", ""] {
            let decision = authorize(
                Some(&doctor),
                Action::Write,
                &Resource::owned_by(ResourceKind::Prescription, owner),
            );
            if owner == "doc-a" {
                assert_eq!(decision, Decision::Allow);
            } else {
                assert_eq!(decision, Decision::Deny(DenyReason::NotOwner));
            }
        }
    }

    #[test]
    fn unlinked_doctor_owns_nothing() {
        let doctor = user(Role::Doctor, None);
        assert_eq!(
            authorize(Some(&doctor), Action::Write, &Resource::owned_by(ResourceKind::Prescription, "doc-a")),
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(visibility(&doctor, ResourceKind::Prescription), Visibility::Nothing);
    }

    #[test]
    fn doctor_edits_only_own_profile() {
        let doctor = user(Role::Doctor, Some("doc-a"));
        assert!(authorize(Some(&doctor), Action::Write, &Resource::owned_by(ResourceKind::Doctor, "doc-a")).is_allowed());
        assert_eq!(
            authorize(Some(&doctor), Action::Write, &Resource::owned_by(ResourceKind::Doctor, "doc-b")),
            Decision::Deny(DenyReason::NotOwner)
        );
        assert!(authorize(Some(&doctor), Action::Read, &Resource::owned_by(ResourceKind::Doctor, "doc-b")).is_allowed());
    }

    #[test]
    fn doctor_profiles_are_removed_by_front_desk_only() {
        let doctor = user(Role::Doctor, Some("doc-a"));
        assert_eq!(
            authorize(Some(&doctor), Action::Delete, &Resource::owned_by(ResourceKind::Doctor, "doc-a")),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        let access = capability(Action::Delete, ResourceKind::Doctor);
        assert_eq!(access.required_roles, &[Role::Admin, Role::Receptionist]);
        assert_eq!(access.ownership, None);
        assert!(authorize(Some(&user(Role::Receptionist, None)), Action::Delete, &Resource::collection(ResourceKind::Doctor)).is_allowed());
    }

    #[test]
    fn delete_follows_write_elsewhere() {
        for kind in [ResourceKind::User, ResourceKind::Patient, ResourceKind::Appointment, ResourceKind::Prescription] {
            let write = capability(Action::Write, kind);
            let delete = capability(Action::Delete, kind);
            assert_eq!(write.required_roles, delete.required_roles);
            assert_eq!(write.ownership, delete.ownership);
        }
    }

    #[test]
    fn role_check_precedes_ownership() {
        let receptionist = user(Role::Receptionist, None);
        assert_eq!(
            authorize(Some(&receptionist), Action::Write, &Resource::owned_by(ResourceKind::Prescription, "doc-a")),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        let doctor = user(Role::Doctor, Some("doc-a"));
        assert_eq!(
            authorize(Some(&doctor), Action::Write, &Resource::collection(ResourceKind::Appointment)),
            Decision::Deny(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn receptionist_capabilities() {
        let r = user(Role::Receptionist, None);
        for kind in [ResourceKind::Patient, ResourceKind::Doctor, ResourceKind::Appointment] {
            assert!(authorize(Some(&r), Action::Read, &Resource::collection(kind)).is_allowed());
            assert!(authorize(Some(&r), Action::Write, &Resource::owned_by(kind, "doc-a")).is_allowed());
        }
        assert!(authorize(Some(&r), Action::Read, &Resource::owned_by(ResourceKind::Prescription, "doc-a")).is_allowed());
        for action in [Action::Read, Action::Write] {
            assert_eq!(
                authorize(Some(&r), action, &Resource::collection(ResourceKind::User)),
                Decision::Deny(DenyReason::InsufficientRole)
            );
        }
        assert_eq!(
            authorize(Some(&r), Action::Read, &Resource::collection(ResourceKind::Dashboard)),
            Decision::Deny(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn ownership_ignored_for_non_doctor_roles() {
        let r = user(Role::Receptionist, Some("doc-z"));
        assert!(authorize(Some(&r), Action::Write, &Resource::owned_by(ResourceKind::Doctor, "doc-a")).is_allowed());
    }

    #[test]
    fn visibility_scopes_doctor_collections() {
        let doctor = user(Role::Doctor, Some("doc-a"));
        assert_eq!(visibility(&doctor, ResourceKind::Prescription), Visibility::Doctor("doc-a".into()));
        assert_eq!(visibility(&doctor, ResourceKind::Appointment), Visibility::Doctor("doc-a".into()));
        assert_eq!(visibility(&doctor, ResourceKind::Doctor), Visibility::All);
        assert_eq!(visibility(&user(Role::Receptionist, None), ResourceKind::Prescription), Visibility::All);

        let v = visibility(&doctor, ResourceKind::Patient);
        assert!(v.permits("doc-a"));
        assert!(!v.permits("doc-b"));
        assert!(!Visibility::Nothing.permits("doc-a"));
    }
}
