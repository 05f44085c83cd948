// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staff roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Staff roles.
///
/// ## Role Hierarchy
///
/// - `Admin` - Unrestricted, including user provisioning
/// - `Doctor` - Clinical reads, writes scoped to the linked doctor record
/// - `Receptionist` - Front-desk reads and writes, prescriptions read-only
///
/// There is no variant for anonymous callers: a request without a resolved
/// identity never reaches the role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Clinician linked to a doctor record
    Doctor,
    /// Front-desk staff
    Receptionist,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Doctor, Role::Receptionist];

    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "doctor" => Some(Role::Doctor),
            "receptionist" => Some(Role::Receptionist),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Receptionist => "receptionist",
        }
    }

    /// Whether records this role touches are filtered by the linked doctor id.
    pub fn is_doctor_scoped(&self) -> bool {
        matches!(self, Role::Doctor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("DOCTOR"), Some(Role::Doctor));
        assert_eq!(Role::parse(" Receptionist "), Some(Role::Receptionist));
        assert_eq!(Role::parse("nurse"), None);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Role::Receptionist).unwrap();
        assert_eq!(json, r#""receptionist""#);
        let role: Role = serde_json::from_str(r#""doctor""#).unwrap();
        assert_eq!(role, Role::Doctor);
    }

    #[test]
    fn only_doctor_is_scoped() {
        assert!(Role::Doctor.is_doctor_scoped());
        assert!(!Role::Admin.is_doctor_scoped());
        assert!(!Role::Receptionist.is_doctor_scoped());
    }
}
