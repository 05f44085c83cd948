// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and the per-request authenticated identity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;
use crate::storage::User;

/// Claims carried inside a session token.
///
/// Deliberately role-free: permissions are resolved live from the
/// credential store on each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id)
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Token id, reserved for a revocation list
    #[serde(default)]
    pub jti: String,
}

impl SessionClaims {
    pub fn new(user_id: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user_id.to_string(),
            iat,
            exp: iat + ttl.num_seconds(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Identity resolved for the current request.
///
/// Built by the request gate from a verified token plus the live user
/// record, then threaded to handlers through request extensions. Never
/// stored globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// User id (token subject)
    pub user_id: String,

    pub username: String,

    /// Current role, as stored
    pub role: Role,

    /// Ownership key for doctor-scoped records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_doctor_id: Option<String>,
}

impl AuthenticatedUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            linked_doctor_id: user.linked_doctor_id.clone(),
        }
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
