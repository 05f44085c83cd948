// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{password::PasswordError, AuthError, Role};
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
    /// Only set on `forbidden`.
    pub required_roles: Option<Vec<Role>>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_roles: Option<Vec<Role>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            required_roles: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    /// The one login failure response. Identical for unknown usernames,
    /// wrong passwords and inactive accounts.
    pub fn invalid_credentials() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid_credentials", "Invalid credentials")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self {
            status: err.status_code(),
            message: err.to_string(),
            code: err.error_code(),
            required_roles: err.required_roles().map(<[Role]>::to_vec),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found(err.to_string()),
            StoreError::Conflict(message) => Self::conflict(message),
            StoreError::Validation(message) => Self::bad_request(message),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Empty => Self::bad_request(err.to_string()),
            other => {
                tracing::error!(error = %other, "Password hashing failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
            required_roles: self.required_roles,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.code, "validation_error");

        let dup = ApiError::conflict("taken");
        assert_eq!(dup.status, StatusCode::CONFLICT);
    }

    #[test]
    fn store_errors_map_to_status() {
        let nf: ApiError = StoreError::not_found("User", "u1").into();
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "User not found: u1");

        let conflict: ApiError = StoreError::Conflict("username or email already exists".into()).into();
        assert_eq!(conflict.status, StatusCode::CONFLICT);

        let invalid: ApiError = StoreError::Validation("username is required".into()).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_password_is_a_validation_error() {
        let err: ApiError = PasswordError::Empty.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = PasswordError::Hash("boom".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("boom"));
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data","error_code":"validation_error"}"#);
    }

    #[tokio::test]
    async fn forbidden_keeps_required_roles() {
        let err: ApiError = AuthError::forbidden(&[Role::Admin, Role::Doctor]).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(json["error_code"], "forbidden");
        assert_eq!(json["required_roles"], serde_json::json!(["admin", "doctor"]));
    }
}
