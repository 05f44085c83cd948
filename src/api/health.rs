// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::Role;
use crate::state::AppState;
use crate::storage::CredentialStore;

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness with individual check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// "ok" or "degraded".
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub service: String,
    /// "ok" when at least one active admin can provision accounts.
    pub admin_account: String,
}

/// Liveness probe. Always 200 while the process runs.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe.
///
/// Returns 503 until an active admin exists, since nobody could sign in to
/// provision staff before that.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "No active admin account", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let has_admin = state
        .store
        .read()
        .await
        .users
        .list()
        .iter()
        .any(|u| u.is_active && u.role == Role::Admin);

    let response = ReadyResponse {
        status: if has_admin { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            admin_account: if has_admin { "ok" } else { "missing" }.to_string(),
        },
    };
    let status = if has_admin {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
