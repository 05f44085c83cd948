// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User administration. Every route here is admin-only through the gate.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::MessageResponse;
use crate::{
    audit_log,
    auth::{Auth, Role},
    error::ApiError,
    state::AppState,
    storage::{AuditEvent, AuditEventType, CredentialStore, NewUser, UserResponse, UserUpdate},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Required when `role` is `doctor`; ignored otherwise.
    #[serde(default, alias = "doctorId")]
    pub linked_doctor_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, alias = "doctorId")]
    pub linked_doctor_id: Option<String>,
    #[serde(default, alias = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(default, alias = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// Newest first.
    pub users: Vec<UserResponse>,
    pub total: usize,
}

/// List all users.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users, newest first", body = UserListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Json<UserListResponse> {
    let users: Vec<UserResponse> = state
        .store
        .read()
        .await
        .users
        .list()
        .iter()
        .map(UserResponse::from)
        .collect();
    let total = users.len();
    Json(UserListResponse { users, total })
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.store.read().await.users.find_by_id(&id)?;
    Ok(Json(user.into()))
}

/// Provision a staff account.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid fields or unknown linked doctor"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 409, description = "Username, email or doctor link already taken")
    )
)]
pub async fn create_user(
    Auth(admin): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let password_hash = state.passwords.hash_blocking(request.password).await?;

    let user = state.store.write().await.create_user(NewUser {
        username: request.username,
        email: request.email,
        password_hash,
        role: request.role,
        linked_doctor_id: request.linked_doctor_id,
    })?;

    AuditEvent::new(AuditEventType::UserCreated)
        .with_user(&admin.user_id)
        .with_resource("user", &user.id)
        .with_details(serde_json::json!({ "role": user.role }))
        .emit();

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Update profile fields, role, doctor link or active flag.
///
/// The password is never changed here.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid fields or self-deactivation"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username, email or doctor link already taken")
    )
)]
pub async fn update_user(
    Auth(admin): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if id == admin.user_id && request.is_active == Some(false) {
        return Err(ApiError::bad_request("you cannot deactivate your own account"));
    }

    let update = UserUpdate {
        username: request.username,
        email: request.email,
        role: request.role,
        linked_doctor_id: request.linked_doctor_id,
    };

    let (before, user) = {
        let mut store = state.store.write().await;
        let before = store.users.find_by_id(&id)?;
        let user = store.apply_user_changes(&id, update, request.is_active)?;
        (before, user)
    };

    audit_log!(AuditEventType::UserUpdated, &admin.user_id, "user", &user.id);
    match (before.is_active, user.is_active) {
        (false, true) => audit_log!(AuditEventType::UserActivated, &admin.user_id, "user", &user.id),
        (true, false) => audit_log!(AuditEventType::UserDeactivated, &admin.user_id, "user", &user.id),
        _ => {}
    }

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Self-deletion"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Auth(admin): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if id == admin.user_id {
        return Err(ApiError::bad_request("you cannot delete your own account"));
    }

    state.store.write().await.users.delete(&id)?;
    audit_log!(AuditEventType::UserDeleted, &admin.user_id, "user", &id);

    Ok(Json(MessageResponse::new("User deleted")))
}

/// Set a user's password without the current one.
#[utoipa::path(
    put,
    path = "/users/{id}/change-password",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Missing new password"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "User not found")
    )
)]
pub async fn reset_password(
    Auth(admin): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // 404 before paying for a hash.
    state.store.read().await.users.find_by_id(&id)?;

    let new_hash = state.passwords.hash_blocking(request.new_password).await?;
    state.store.write().await.users.set_password(&id, new_hash)?;
    audit_log!(AuditEventType::PasswordReset, &admin.user_id, "user", &id);

    Ok(Json(MessageResponse::new("Password reset")))
}
