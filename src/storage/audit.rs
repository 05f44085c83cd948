// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit events for security-sensitive operations.
//!
//! Events are emitted on the `audit` tracing target as structured fields so
//! the log pipeline can route them separately from diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Types of auditable events.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Session events
    LoginSucceeded,
    LoginFailed,
    Logout,
    TokenRejected,
    PasswordChanged,

    // User management events
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserActivated,
    UserDeactivated,
    PasswordReset,

    // Authorization events
    AccessDenied,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::LoginSucceeded => "login_succeeded",
            AuditEventType::LoginFailed => "login_failed",
            AuditEventType::Logout => "logout",
            AuditEventType::TokenRejected => "token_rejected",
            AuditEventType::PasswordChanged => "password_changed",
            AuditEventType::UserCreated => "user_created",
            AuditEventType::UserUpdated => "user_updated",
            AuditEventType::UserDeleted => "user_deleted",
            AuditEventType::UserActivated => "user_activated",
            AuditEventType::UserDeactivated => "user_deactivated",
            AuditEventType::PasswordReset => "password_reset",
            AuditEventType::AccessDenied => "access_denied",
        }
    }
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    /// Acting user, when known.
    pub user_id: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub success: bool,
    /// Internal reason; never sent to the client.
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_type: None,
            resource_id: None,
            details: None,
            success: true,
            error: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with an internal reason.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    /// Write the event to the `audit` target.
    pub fn emit(&self) {
        let details = self.details.as_ref().map(|d| d.to_string());
        if self.success {
            tracing::info!(
                target: "audit",
                event_id = %self.event_id,
                event_type = self.event_type.as_str(),
                user_id = self.user_id.as_deref(),
                resource_type = self.resource_type.as_deref(),
                resource_id = self.resource_id.as_deref(),
                details = details.as_deref(),
                success = true,
            );
        } else {
            tracing::warn!(
                target: "audit",
                event_id = %self.event_id,
                event_type = self.event_type.as_str(),
                user_id = self.user_id.as_deref(),
                resource_type = self.resource_type.as_deref(),
                resource_id = self.resource_id.as_deref(),
                details = details.as_deref(),
                error = self.error.as_deref(),
                success = false,
            );
        }
    }
}

/// Helper macro for emitting audit events.
#[macro_export]
macro_rules! audit_log {
    ($event_type:expr, $user_id:expr) => {{
        $crate::storage::AuditEvent::new($event_type)
            .with_user($user_id)
            .emit();
    }};
    ($event_type:expr, $user_id:expr, $resource_type:expr, $resource_id:expr) => {{
        $crate::storage::AuditEvent::new($event_type)
            .with_user($user_id)
            .with_resource($resource_type, $resource_id)
            .emit();
    }};
}
