// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        gated,
        policy::{capability, Action::*, ResourceKind, RouteAccess},
        Role,
    },
    models::{
        Appointment, AppointmentInput, Doctor, DoctorInput, Patient, PatientInput, Prescription,
        PrescriptionInput,
    },
    state::AppState,
    storage::UserResponse,
};

pub mod appointments;
pub mod auth;
pub mod dashboard;
pub mod doctors;
pub mod health;
pub mod patients;
pub mod prescriptions;
pub mod users;


/// Plain confirmation body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let s = &state;

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", gated(get(auth::profile), s, RouteAccess::AUTHENTICATED))
        .route(
            "/auth/change-password",
            gated(put(auth::change_password), s, RouteAccess::AUTHENTICATED),
        )
        .route("/auth/logout", gated(post(auth::logout), s, RouteAccess::AUTHENTICATED))
        .route(
            "/auth/users",
            gated(get(users::list_users), s, capability(Read, ResourceKind::User)),
        );

    let user_routes = Router::new()
        .route(
            "/users",
            gated(
                get(users::list_users).post(users::create_user),
                s,
                capability(Write, ResourceKind::User),
            ),
        )
        .route(
            "/users/{id}",
            gated(
                get(users::get_user)
                    .put(users::update_user)
                    .delete(users::delete_user),
                s,
                capability(Write, ResourceKind::User),
            ),
        )
        .route(
            "/users/{id}/change-password",
            gated(put(users::reset_password), s, capability(Write, ResourceKind::User)),
        );

    let patient_routes = Router::new()
        .route(
            "/patients",
            gated(get(patients::list_patients), s, capability(Read, ResourceKind::Patient))
                .merge(gated(post(patients::create_patient), s, capability(Write, ResourceKind::Patient))),
        )
        .route(
            "/patients/{id}",
            gated(get(patients::get_patient), s, capability(Read, ResourceKind::Patient))
                .merge(gated(put(patients::update_patient), s, capability(Write, ResourceKind::Patient)))
                .merge(gated(
                    delete(patients::delete_patient),
                    s,
                    capability(Delete, ResourceKind::Patient),
                )),
        )
        .route(
            "/patients/{id}/details",
            gated(get(patients::patient_details), s, capability(Read, ResourceKind::Patient)),
        );

    let doctor_routes = Router::new()
        .route(
            "/doctors",
            gated(get(doctors::list_doctors), s, capability(Read, ResourceKind::Doctor))
                .merge(gated(post(doctors::create_doctor), s, capability(Write, ResourceKind::Doctor))),
        )
        .route(
            "/doctors/{id}",
            gated(get(doctors::get_doctor), s, capability(Read, ResourceKind::Doctor))
                .merge(gated(put(doctors::update_doctor), s, capability(Write, ResourceKind::Doctor)))
                .merge(gated(delete(doctors::delete_doctor), s, capability(Delete, ResourceKind::Doctor))),
        );

    let appointment_routes = Router::new()
        .route(
            "/appointments",
            gated(
                get(appointments::list_appointments),
                s,
                capability(Read, ResourceKind::Appointment),
            )
            .merge(gated(
                post(appointments::create_appointment),
                s,
                capability(Write, ResourceKind::Appointment),
            )),
        )
        .route(
            "/appointments/{id}",
            gated(
                get(appointments::get_appointment),
                s,
                capability(Read, ResourceKind::Appointment),
            )
            .merge(gated(
                put(appointments::update_appointment),
                s,
                capability(Write, ResourceKind::Appointment),
            ))
            .merge(gated(
                delete(appointments::delete_appointment),
                s,
                capability(Delete, ResourceKind::Appointment),
            )),
        );

    let prescription_routes = Router::new()
        .route(
            "/prescriptions",
            gated(
                get(prescriptions::list_prescriptions),
                s,
                capability(Read, ResourceKind::Prescription),
            )
            .merge(gated(
                post(prescriptions::create_prescription),
                s,
                capability(Write, ResourceKind::Prescription),
            )),
        )
        .route(
            "/prescriptions/{id}",
            gated(
                get(prescriptions::get_prescription),
                s,
                capability(Read, ResourceKind::Prescription),
            )
            .merge(gated(
                put(prescriptions::update_prescription),
                s,
                capability(Write, ResourceKind::Prescription),
            ))
            .merge(gated(
                delete(prescriptions::delete_prescription),
                s,
                capability(Delete, ResourceKind::Prescription),
            )),
        );

    let dashboard_routes = Router::new()
        .route(
            "/dashboard",
            gated(
                get(dashboard::admin_dashboard),
                s,
                RouteAccess::admin(Read, ResourceKind::Dashboard),
            ),
        )
        .route(
            "/dashboard/doctor",
            gated(
                get(dashboard::doctor_dashboard),
                s,
                capability(Read, ResourceKind::Dashboard),
            ),
        );

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes)
        .merge(user_routes)
        .merge(patient_routes)
        .merge(doctor_routes)
        .merge(appointment_routes)
        .merge(prescription_routes)
        .merge(dashboard_routes)
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        auth::login,
        auth::profile,
        auth::change_password,
        auth::logout,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::reset_password,
        patients::list_patients,
        patients::get_patient,
        patients::patient_details,
        patients::create_patient,
        patients::update_patient,
        patients::delete_patient,
        doctors::list_doctors,
        doctors::get_doctor,
        doctors::create_doctor,
        doctors::update_doctor,
        doctors::delete_doctor,
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::create_appointment,
        appointments::update_appointment,
        appointments::delete_appointment,
        prescriptions::list_prescriptions,
        prescriptions::get_prescription,
        prescriptions::create_prescription,
        prescriptions::update_prescription,
        prescriptions::delete_prescription,
        dashboard::admin_dashboard,
        dashboard::doctor_dashboard
    ),
    components(
        schemas(
            Role,
            MessageResponse,
            UserResponse,
            Doctor,
            DoctorInput,
            Patient,
            PatientInput,
            Appointment,
            AppointmentInput,
            Prescription,
            PrescriptionInput,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionUser,
            auth::ProfileResponse,
            auth::ChangePasswordRequest,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            users::ResetPasswordRequest,
            users::UserListResponse,
            patients::PatientDetails,
            dashboard::AdminDashboardResponse,
            dashboard::DoctorDashboardResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Login, profile and password change"),
        (name = "Users", description = "Staff account administration"),
        (name = "Patients", description = "Patient records"),
        (name = "Doctors", description = "Doctor profiles"),
        (name = "Appointments", description = "Appointments, scoped per doctor"),
        (name = "Prescriptions", description = "Prescriptions, owned by the issuing doctor"),
        (name = "Dashboard", description = "Summary figures")
    )
)]
struct ApiDoc;
