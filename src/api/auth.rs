// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: login, profile, password change, logout.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::MessageResponse;
use crate::{
    audit_log,
    auth::{Auth, Role},
    error::ApiError,
    state::AppState,
    storage::{AuditEvent, AuditEventType, CredentialStore, User, UserResponse},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Identity summary returned at login.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub linked_doctor_id: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            linked_doctor_id: user.linked_doctor_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header.
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    #[serde(default, alias = "currentPassword")]
    pub current_password: String,
    #[serde(default, alias = "newPassword")]
    pub new_password: String,
}

/// Exchange credentials for a session token.
///
/// Unknown usernames, wrong passwords and deactivated accounts all get the
/// same 401 response.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = request.username.trim().to_string();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let user = state.store.read().await.users.find_by_username(&username).ok();

    // Unknown users still pay for one verification.
    let digest = user.as_ref().map(|u| u.password_hash.clone());
    let password_ok = state.passwords.verify_blocking(request.password, digest).await;

    let user = match user {
        Some(user) if password_ok && user.is_active => user,
        other => {
            let reason = match &other {
                None => "unknown_user",
                Some(u) if !password_ok => {
                    tracing::debug!(user_id = %u.id, "Login with wrong password");
                    "wrong_password"
                }
                Some(_) => "inactive_account",
            };
            AuditEvent::new(AuditEventType::LoginFailed)
                .with_details(serde_json::json!({ "username": username }))
                .failed(reason)
                .emit();
            return Err(ApiError::invalid_credentials());
        }
    };

    let issued = state
        .tokens
        .issue(&user.id, state.tokens.default_ttl())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to sign session token");
            ApiError::internal("Internal server error")
        })?;

    if let Err(e) = state.store.write().await.users.touch_last_login(&user.id, Utc::now()) {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to record last login");
    }

    audit_log!(AuditEventType::LoginSucceeded, &user.id);

    Ok(Json(LoginResponse {
        expires_at: issued.expires_at(),
        token: issued.token,
        token_type: "Bearer".to_string(),
        user: SessionUser::from(&user),
    }))
}

/// Current user's profile, including last login.
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let stored = state.store.read().await.users.find_by_id(&user.user_id)?;
    Ok(Json(ProfileResponse {
        user: UserResponse::from(&stored),
    }))
}

/// Change the caller's own password.
#[utoipa::path(
    put,
    path = "/auth/change-password",
    tag = "Auth",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing fields or wrong current password"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn change_password(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(ApiError::bad_request(
            "current_password and new_password are required",
        ));
    }

    let digest = state.store.read().await.users.find_by_id(&user.user_id)?.password_hash;
    if !state
        .passwords
        .verify_blocking(request.current_password, Some(digest))
        .await
    {
        AuditEvent::new(AuditEventType::PasswordChanged)
            .with_user(&user.user_id)
            .failed("wrong_current_password")
            .emit();
        return Err(ApiError::bad_request("current password is incorrect"));
    }

    let new_hash = state.passwords.hash_blocking(request.new_password).await?;
    state.store.write().await.users.set_password(&user.user_id, new_hash)?;

    audit_log!(AuditEventType::PasswordChanged, &user.user_id);

    Ok(Json(MessageResponse::new("Password changed")))
}

/// End the session on the client side.
///
/// Tokens are stateless, so nothing is revoked server-side; the token
/// stays valid until it expires.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(Auth(user): Auth) -> Json<MessageResponse> {
    audit_log!(AuditEventType::Logout, &user.user_id);
    Json(MessageResponse::new("Logged out"))
}
