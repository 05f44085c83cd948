// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dashboard figures.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{auth::Guard, state::AppState};

/// Clinic-wide totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboardResponse {
    pub users: usize,
    pub patients: usize,
    pub doctors: usize,
    pub appointments: usize,
    pub prescriptions: usize,
}

/// Totals for the caller's own practice. All zero for a doctor account
/// without a doctor link.
#[derive(Debug, Serialize, ToSchema)]
pub struct DoctorDashboardResponse {
    pub patients: usize,
    pub appointments: usize,
    pub prescriptions: usize,
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Clinic-wide totals", body = AdminDashboardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn admin_dashboard(
    guard: Guard,
    State(state): State<AppState>,
) -> Json<AdminDashboardResponse> {
    let store = state.store.read().await;
    let counts = store.counts(&guard.visibility());
    Json(AdminDashboardResponse {
        users: store.users.len(),
        patients: counts.patients,
        doctors: counts.doctors,
        appointments: counts.appointments,
        prescriptions: counts.prescriptions,
    })
}

#[utoipa::path(
    get,
    path = "/dashboard/doctor",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Totals scoped to the caller", body = DoctorDashboardResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin or doctor required)")
    )
)]
pub async fn doctor_dashboard(
    guard: Guard,
    State(state): State<AppState>,
) -> Json<DoctorDashboardResponse> {
    let counts = state.store.read().await.counts(&guard.visibility());
    Json(DoctorDashboardResponse {
        patients: counts.patients,
        appointments: counts.appointments,
        prescriptions: counts.prescriptions,
    })
}
