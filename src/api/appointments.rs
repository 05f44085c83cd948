// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Appointments.
//!
//! Any staff member may read, but doctors only see appointments booked with
//! them. Booking, rescheduling and cancelling is front-desk work.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::MessageResponse;
use crate::{
    auth::Guard,
    error::ApiError,
    models::{new_record_id, Appointment, AppointmentInput},
    state::AppState,
    storage::RecordStore,
};

#[utoipa::path(
    get,
    path = "/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible appointments", body = [Appointment]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_appointments(
    guard: Guard,
    State(state): State<AppState>,
) -> Json<Vec<Appointment>> {
    let visibility = guard.visibility();
    let appointments = state
        .store
        .read()
        .await
        .appointments
        .filter(|a| visibility.permits(&a.doctor_id));
    Json(appointments)
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Booked with another doctor"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    guard: Guard,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = state.store.read().await.appointments.get(&id)?;
    guard.authorize_record(&appointment)?;
    Ok(Json(appointment))
}

#[utoipa::path(
    post,
    path = "/appointments",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    request_body = AppointmentInput,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Missing fields or unknown patient/doctor"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized")
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(input): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    input.validate()?;
    let appointment = {
        let mut store = state.store.write().await;
        store.ensure_references(&input.patient_id, &input.doctor_id)?;
        store
            .appointments
            .insert(Appointment::from_input(new_record_id(), input))?
    };
    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        "Appointment booked"
    );
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Appointment ID")),
    request_body = AppointmentInput,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 400, description = "Missing fields or unknown patient/doctor"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AppointmentInput>,
) -> Result<Json<Appointment>, ApiError> {
    input.validate()?;
    let mut store = state.store.write().await;
    store.ensure_references(&input.patient_id, &input.doctor_id)?;
    let appointment = store
        .appointments
        .update(Appointment::from_input(id, input))?;
    Ok(Json(appointment))
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment cancelled", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.write().await.appointments.remove(&id)?;
    tracing::info!(appointment_id = %id, "Appointment cancelled");
    Ok(Json(MessageResponse::new("Appointment deleted")))
}
