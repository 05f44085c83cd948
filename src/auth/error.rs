// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Externally visible authentication/authorization failures.
//!
//! Internal reasons (which token check failed, whether the user was deleted
//! or deactivated, role versus ownership denial) are collapsed here so the
//! response never tells a caller more than "who are you" or "not allowed".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::{policy::DenyReason, roles::Role, token::TokenError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Missing, invalid or expired token, or the user is gone or inactive.
    #[error("Authentication required")]
    Unauthenticated,
    /// Valid identity, but role or ownership check failed.
    #[error("Insufficient permissions for this operation")]
    Forbidden { required_roles: Vec<Role> },
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_roles: Option<Vec<Role>>,
}

impl AuthError {
    pub fn forbidden(required_roles: &[Role]) -> Self {
        AuthError::Forbidden {
            required_roles: required_roles.to_vec(),
        }
    }

    /// Map a policy denial to its external form.
    pub fn from_denial(reason: DenyReason, required_roles: &[Role]) -> Self {
        match reason {
            DenyReason::Unauthenticated => AuthError::Unauthenticated,
            DenyReason::InsufficientRole | DenyReason::NotOwner => Self::forbidden(required_roles),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Forbidden { .. } => "forbidden",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn required_roles(&self) -> Option<&[Role]> {
        match self {
            AuthError::Unauthenticated => None,
            AuthError::Forbidden { required_roles } => Some(required_roles),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::Unauthenticated
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code(),
            required_roles: self.required_roles().map(<[Role]>::to_vec),
        });
        (status, body).into_response()
    }
}
