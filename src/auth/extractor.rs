// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the resolved identity.
//!
//! Behind the gate the identity is already in request extensions:
//!
//! ```rust,ignore
//! async fn profile(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Handlers that load a doctor-scoped record take a [`Guard`] instead and
//! call [`Guard::authorize_record`] before returning or changing it.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::authenticate;
use super::policy::{self, evaluate, Decision, RouteAccess, Visibility};
use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;
use crate::storage::{AuditEvent, AuditEventType, DoctorScoped};

/// Extractor for authenticated users.
///
/// Uses the identity set by the gate; on an ungated route it authenticates
/// the bearer token itself.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if the gate already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let user = authenticate(state, &parts.headers).await?;
        Ok(Auth(user))
    }
}

/// Identity plus the route's access descriptor, for record-level checks.
///
/// Only available on gated routes.
#[derive(Debug, Clone)]
pub struct Guard {
    pub user: AuthenticatedUser,
    pub access: RouteAccess,
}

impl<S: Send + Sync> FromRequestParts<S> for Guard {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthenticatedUser>().cloned();
        let access = parts.extensions.get::<RouteAccess>().copied();
        match (user, access) {
            (Some(user), Some(access)) => Ok(Guard { user, access }),
            _ => {
                tracing::error!(path = %parts.uri.path(), "Guard used on a route without the gate");
                Err(AuthError::Unauthenticated)
            }
        }
    }
}

impl Guard {
    /// Check the route's ownership predicate against a loaded record.
    ///
    /// Routes without an ownership predicate and non-doctor roles pass.
    pub fn authorize_record<R: DoctorScoped>(&self, record: &R) -> Result<(), AuthError> {
        match evaluate(Some(&self.user), &self.access, Some(record.owner_doctor_id())) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                tracing::debug!(user_id = %self.user.user_id, ?reason, resource = ?R::RESOURCE, "Record access denied");
                AuditEvent::new(AuditEventType::AccessDenied)
                    .with_user(&self.user.user_id)
                    .with_details(serde_json::json!({
                        "resource": R::RESOURCE,
                        "action": self.access.action,
                        "reason": reason,
                    }))
                    .failed("denied by policy")
                    .emit();
                Err(AuthError::from_denial(reason, self.access.required_roles))
            }
        }
    }

    /// Row filter for listing the route's resource.
    pub fn visibility(&self) -> Visibility {
        policy::visibility(&self.user, self.access.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::{capability, Action, ResourceKind};
    use crate::auth::Role;
    use crate::models::Prescription;
    use crate::state::test_state;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder().uri("/test").body(()).unwrap().into_parts().0
    }

    fn doctor(linked: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "user_dr".to_string(),
            username: "drA".to_string(),
            role: Role::Doctor,
            linked_doctor_id: Some(linked.to_string()),
        }
    }

    fn prescription(doctor_id: &str) -> Prescription {
        Prescription {
            id: "rx-1".into(),
            patient_id: "p-1".into(),
            doctor_id: doctor_id.into(),
            medications: vec![],
            issued_on: None,
            instructions: None,
        }
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = test_state();
        let mut parts = parts();

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let state = test_state();
        let mut parts = parts();
        parts.extensions.insert(doctor("doc-a"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.username, "drA");
    }

    #[tokio::test]
    async fn guard_requires_gate() {
        let mut parts = parts();
        parts.extensions.insert(doctor("doc-a"));
        assert!(Guard::from_request_parts(&mut parts, &()).await.is_err());

        parts.extensions.insert(capability(Action::Write, ResourceKind::Prescription));
        let guard = Guard::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(guard.access.resource, ResourceKind::Prescription);
    }

    #[test]
    fn guard_checks_record_owner() {
        let guard = Guard {
            user: doctor("doc-a"),
            access: capability(Action::Write, ResourceKind::Prescription),
        };
        assert!(guard.authorize_record(&prescription("doc-a")).is_ok());
        assert_eq!(
            guard.authorize_record(&prescription("doc-b")),
            Err(AuthError::forbidden(&[Role::Admin, Role::Doctor]))
        );
        assert_eq!(guard.visibility(), Visibility::Doctor("doc-a".into()));
    }

    #[test]
    fn guard_without_ownership_predicate_passes() {
        let guard = Guard {
            user: AuthenticatedUser {
                role: Role::Receptionist,
                linked_doctor_id: None,
                ..doctor("doc-a")
            },
            access: capability(Action::Read, ResourceKind::Prescription),
        };
        assert!(guard.authorize_record(&prescription("doc-b")).is_ok());
        assert_eq!(guard.visibility(), Visibility::All);
    }
}
