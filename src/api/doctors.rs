// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Doctor profiles.
//!
//! All staff may read. Writes are open to all staff, but the gate checks the
//! `{id}` path segment against a doctor's own link, so a doctor can only
//! edit their own profile and cannot create new ones. Deleting is front-desk
//! work and is refused while a user account still links to the profile.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::MessageResponse;
use crate::{
    error::ApiError,
    models::{new_record_id, Doctor, DoctorInput},
    state::AppState,
    storage::RecordStore,
};

#[utoipa::path(
    get,
    path = "/doctors",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All doctors", body = [Doctor]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_doctors(State(state): State<AppState>) -> Json<Vec<Doctor>> {
    Json(state.store.read().await.doctors.filter(|_| true))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor", body = Doctor),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Doctor not found")
    )
)]
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    Ok(Json(state.store.read().await.doctors.get(&id)?))
}

#[utoipa::path(
    post,
    path = "/doctors",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    request_body = DoctorInput,
    responses(
        (status = 201, description = "Doctor created", body = Doctor),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized")
    )
)]
pub async fn create_doctor(
    State(state): State<AppState>,
    Json(input): Json<DoctorInput>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    input.validate()?;
    let doctor = Doctor::from_input(new_record_id(), input);
    let doctor = state.store.write().await.doctors.insert(doctor)?;
    tracing::info!(doctor_id = %doctor.id, "Doctor created");
    Ok((StatusCode::CREATED, Json(doctor)))
}

#[utoipa::path(
    put,
    path = "/doctors/{id}",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Doctor ID")),
    request_body = DoctorInput,
    responses(
        (status = 200, description = "Doctor updated", body = Doctor),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized or not your profile"),
        (status = 404, description = "Doctor not found")
    )
)]
pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DoctorInput>,
) -> Result<Json<Doctor>, ApiError> {
    input.validate()?;
    let doctor = state
        .store
        .write()
        .await
        .doctors
        .update(Doctor::from_input(id, input))?;
    Ok(Json(doctor))
}

#[utoipa::path(
    delete,
    path = "/doctors/{id}",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Doctor not found"),
        (status = 409, description = "A user account is linked to this doctor")
    )
)]
pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.write().await.remove_doctor(&id)?;
    tracing::info!(doctor_id = %id, "Doctor deleted");
    Ok(Json(MessageResponse::new("Doctor deleted")))
}
