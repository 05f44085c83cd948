// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prescriptions.
//!
//! All staff may read; only admins and doctors may write. A doctor only
//! reads, writes or deletes prescriptions whose `doctor_id` is their own
//! linked doctor, and cannot hand a prescription over to another doctor.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::MessageResponse;
use crate::{
    auth::Guard,
    error::ApiError,
    models::{new_record_id, Prescription, PrescriptionInput},
    state::AppState,
    storage::RecordStore,
};

#[utoipa::path(
    get,
    path = "/prescriptions",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible prescriptions", body = [Prescription]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_prescriptions(
    guard: Guard,
    State(state): State<AppState>,
) -> Json<Vec<Prescription>> {
    let visibility = guard.visibility();
    let prescriptions = state
        .store
        .read()
        .await
        .prescriptions
        .filter(|p| visibility.permits(&p.doctor_id));
    Json(prescriptions)
}

#[utoipa::path(
    get,
    path = "/prescriptions/{id}",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription", body = Prescription),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Issued by another doctor"),
        (status = 404, description = "Prescription not found")
    )
)]
pub async fn get_prescription(
    guard: Guard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Prescription>, ApiError> {
    let prescription = state.store.read().await.prescriptions.get(&id)?;
    guard.authorize_record(&prescription)?;
    Ok(Json(prescription))
}

#[utoipa::path(
    post,
    path = "/prescriptions",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    request_body = PrescriptionInput,
    responses(
        (status = 201, description = "Prescription issued", body = Prescription),
        (status = 400, description = "Missing fields or unknown patient/doctor"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized or issued for another doctor")
    )
)]
pub async fn create_prescription(
    guard: Guard,
    State(state): State<AppState>,
    Json(input): Json<PrescriptionInput>,
) -> Result<(StatusCode, Json<Prescription>), ApiError> {
    input.validate()?;
    let prescription = Prescription::from_input(new_record_id(), input);
    guard.authorize_record(&prescription)?;

    let prescription = {
        let mut store = state.store.write().await;
        store.ensure_references(&prescription.patient_id, &prescription.doctor_id)?;
        store.prescriptions.insert(prescription)?
    };
    tracing::info!(
        prescription_id = %prescription.id,
        doctor_id = %prescription.doctor_id,
        "Prescription issued"
    );
    Ok((StatusCode::CREATED, Json(prescription)))
}

/// Replace a prescription. Doctors must own both the stored and the new
/// version.
#[utoipa::path(
    put,
    path = "/prescriptions/{id}",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Prescription ID")),
    request_body = PrescriptionInput,
    responses(
        (status = 200, description = "Prescription updated", body = Prescription),
        (status = 400, description = "Missing fields or unknown patient/doctor"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized or issued by another doctor"),
        (status = 404, description = "Prescription not found")
    )
)]
pub async fn update_prescription(
    guard: Guard,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PrescriptionInput>,
) -> Result<Json<Prescription>, ApiError> {
    let mut store = state.store.write().await;
    let existing = store.prescriptions.get(&id)?;
    guard.authorize_record(&existing)?;

    input.validate()?;
    let replacement = Prescription::from_input(id, input);
    guard.authorize_record(&replacement)?;
    store.ensure_references(&replacement.patient_id, &replacement.doctor_id)?;

    Ok(Json(store.prescriptions.update(replacement)?))
}

#[utoipa::path(
    delete,
    path = "/prescriptions/{id}",
    tag = "Prescriptions",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Prescription ID")),
    responses(
        (status = 200, description = "Prescription deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized or issued by another doctor"),
        (status = 404, description = "Prescription not found")
    )
)]
pub async fn delete_prescription(
    guard: Guard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut store = state.store.write().await;
    let existing = store.prescriptions.get(&id)?;
    guard.authorize_record(&existing)?;
    store.prescriptions.remove(&id)?;
    tracing::info!(prescription_id = %id, user_id = %guard.user.user_id, "Prescription deleted");
    Ok(Json(MessageResponse::new("Prescription deleted")))
}
