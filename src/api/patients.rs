// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Patient records.
//!
//! Reads are open to all staff, writes to admins and receptionists. Doctors
//! listing patients only see patients they have an appointment or a
//! prescription with.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::MessageResponse;
use crate::{
    auth::Guard,
    error::ApiError,
    models::{new_record_id, Appointment, Patient, PatientInput, Prescription},
    state::AppState,
    storage::RecordStore,
};

/// A patient with the appointments and prescriptions the caller may see.
#[derive(Debug, Serialize, ToSchema)]
pub struct PatientDetails {
    #[serde(flatten)]
    pub patient: Patient,
    pub appointments: Vec<Appointment>,
    pub prescriptions: Vec<Prescription>,
}

#[utoipa::path(
    get,
    path = "/patients",
    tag = "Patients",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible patients", body = [Patient]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_patients(guard: Guard, State(state): State<AppState>) -> Json<Vec<Patient>> {
    let visibility = guard.visibility();
    Json(state.store.read().await.visible_patients(&visibility))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    Ok(Json(state.store.read().await.patients.get(&id)?))
}

/// Patient with related appointments and prescriptions, scoped for doctors.
#[utoipa::path(
    get,
    path = "/patients/{id}/details",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient details", body = PatientDetails),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn patient_details(
    guard: Guard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientDetails>, ApiError> {
    let visibility = guard.visibility();
    let store = state.store.read().await;
    let patient = store.patients.get(&id)?;
    let appointments = store
        .appointments
        .filter(|a| a.patient_id == id && visibility.permits(&a.doctor_id));
    let prescriptions = store
        .prescriptions
        .filter(|p| p.patient_id == id && visibility.permits(&p.doctor_id));

    Ok(Json(PatientDetails {
        patient,
        appointments,
        prescriptions,
    }))
}

#[utoipa::path(
    post,
    path = "/patients",
    tag = "Patients",
    security(("bearer_auth" = [])),
    request_body = PatientInput,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized")
    )
)]
pub async fn create_patient(
    State(state): State<AppState>,
    Json(input): Json<PatientInput>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    input.validate()?;
    let patient = Patient::from_input(new_record_id(), input);
    let patient = state.store.write().await.patients.insert(patient)?;
    tracing::info!(patient_id = %patient.id, "Patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    request_body = PatientInput,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PatientInput>,
) -> Result<Json<Patient>, ApiError> {
    input.validate()?;
    let patient = state
        .store
        .write()
        .await
        .patients
        .update(Patient::from_input(id, input))?;
    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    tag = "Patients",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Patient not found")
    )
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.write().await.patients.remove(&id)?;
    tracing::info!(patient_id = %id, "Patient deleted");
    Ok(Json(MessageResponse::new("Patient deleted")))
}
