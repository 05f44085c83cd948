// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Record types and store contracts for the auth core.
//!
//! - `users` - credential records and the [`CredentialStore`] contract
//! - `records` - the generic [`RecordStore`] contract for clinical rows
//! - `ownership` - doctor-scoped records ([`DoctorScoped`])
//! - `audit` - security audit events
//!
//! The in-memory implementation lives in [`crate::store`]. Every mutating
//! operation completes inside a single call on `&mut self`, so callers
//! holding the store's write lock get atomic per-row updates.

pub mod audit;
pub mod ownership;
pub mod records;
pub mod users;

pub use audit::{AuditEvent, AuditEventType};
pub use ownership::DoctorScoped;
pub use records::{Record, RecordStore, Table};
pub use users::{normalize_email, CredentialStore, NewUser, User, UserResponse, UserTable, UserUpdate};

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
    /// Unique constraint violated (username, email, doctor link).
    #[error("{0}")]
    Conflict(String),
    /// Input rejected before touching the store.
    #[error("{0}")]
    Validation(String),
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            resource,
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
