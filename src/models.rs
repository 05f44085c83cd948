// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Clinical Record Models
//!
//! The four flat record types the auth core scopes access to. Only the
//! fields needed for ownership (`doctor_id`) and a minimal payload are
//! modelled, and inputs only check their required fields.
//!
//! Each `*Input` type is the body of both `POST` (create) and `PUT`
//! (full replace) on its collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::{Record, StoreError, StoreResult};

// =============================================================================
// Doctors
// =============================================================================

/// Doctor profile. Anchor of all ownership scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Doctor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DoctorInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Doctor {
    pub fn from_input(id: String, input: DoctorInput) -> Self {
        Self {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            specialty: input.specialty,
            phone: input.phone,
            address: input.address,
        }
    }
}

// =============================================================================
// Patients
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Patient {
    pub fn from_input(id: String, input: PatientInput) -> Self {
        Self {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            birth_date: input.birth_date,
            sex: input.sex,
            phone: input.phone,
            address: input.address,
        }
    }
}

// =============================================================================
// Appointments
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    /// Owning doctor
    pub doctor_id: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentInput {
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Appointment {
    pub fn from_input(id: String, input: AppointmentInput) -> Self {
        Self {
            id,
            patient_id: input.patient_id,
            doctor_id: input.doctor_id,
            scheduled_at: input.scheduled_at,
            reason: input.reason,
        }
    }
}

// =============================================================================
// Prescriptions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Prescription {
    pub id: String,
    pub patient_id: String,
    /// Owning doctor
    pub doctor_id: String,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub issued_on: Option<NaiveDate>,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrescriptionInput {
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub issued_on: Option<NaiveDate>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl Prescription {
    pub fn from_input(id: String, input: PrescriptionInput) -> Self {
        Self {
            id,
            patient_id: input.patient_id,
            doctor_id: input.doctor_id,
            medications: input.medications,
            issued_on: input.issued_on,
            instructions: input.instructions,
        }
    }
}

/// Fresh record id.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

fn required(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

impl DoctorInput {
    pub fn validate(&self) -> StoreResult<()> {
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)
    }
}

impl PatientInput {
    pub fn validate(&self) -> StoreResult<()> {
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)
    }
}

impl AppointmentInput {
    pub fn validate(&self) -> StoreResult<()> {
        required("patient_id", &self.patient_id)?;
        required("doctor_id", &self.doctor_id)
    }
}

impl PrescriptionInput {
    pub fn validate(&self) -> StoreResult<()> {
        required("patient_id", &self.patient_id)?;
        required("doctor_id", &self.doctor_id)?;
        if self.medications.iter().all(|m| m.trim().is_empty()) {
            return Err(StoreError::Validation("at least one medication is required".into()));
        }
        Ok(())
    }
}

macro_rules! impl_record {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl Record for $ty {
                const KIND: &'static str = $kind;

                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_record! {
    Doctor => "Doctor",
    Patient => "Patient",
    Appointment => "Appointment",
    Prescription => "Prescription",
}
