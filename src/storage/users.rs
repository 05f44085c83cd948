// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential records.
//!
//! [`User`] is the internal record and carries the password digest; it has
//! no `Serialize` impl. Anything leaving the service goes through
//! [`UserResponse`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{StoreError, StoreResult};
use crate::auth::Role;

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Unique, case-sensitive
    pub username: String,
    /// Unique, stored normalized (see [`normalize_email`])
    pub email: String,
    /// Argon2 PHC digest. Only changed through `set_password`.
    pub password_hash: String,
    pub role: Role,
    /// Set iff `role == Doctor`
    pub linked_doctor_id: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// User as returned to API clients (never includes the password digest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub linked_doctor_id: Option<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            linked_doctor_id: user.linked_doctor_id.clone(),
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Fields for provisioning a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub linked_doctor_id: Option<String>,
}

/// Partial update of non-credential fields.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub linked_doctor_id: Option<String>,
}

/// NFKC, trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.nfkc().collect::<String>().trim().to_lowercase()
}

/// Credential store contract.
///
/// Lookups return the internal [`User`] including its digest; only the login
/// and change-password paths read that field.
pub trait CredentialStore {
    fn find_by_username(&self, username: &str) -> StoreResult<User>;

    fn find_by_id(&self, id: &str) -> StoreResult<User>;

    /// All users, newest first.
    fn list(&self) -> Vec<User>;

    /// Conflict when the username or (normalized) email is taken, or when
    /// another active user already holds the doctor link.
    fn create(&mut self, fields: NewUser) -> StoreResult<User>;

    fn update_fields(&mut self, id: &str, update: UserUpdate) -> StoreResult<User>;

    fn set_password(&mut self, id: &str, new_hash: String) -> StoreResult<()>;

    fn deactivate(&mut self, id: &str) -> StoreResult<User>;

    fn reactivate(&mut self, id: &str) -> StoreResult<User>;

    /// Hard delete.
    fn delete(&mut self, id: &str) -> StoreResult<()>;

    fn touch_last_login(&mut self, id: &str, at: DateTime<Utc>) -> StoreResult<()>;
}

/// In-memory user table.
#[derive(Debug, Default)]
pub struct UserTable {
    rows: HashMap<String, User>,
}

impl UserTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any account, active or not, links to `doctor_id`.
    pub fn links_doctor(&self, doctor_id: &str) -> bool {
        self.rows
            .values()
            .any(|u| u.linked_doctor_id.as_deref() == Some(doctor_id))
    }

    fn get_mut(&mut self, id: &str) -> StoreResult<&mut User> {
        self.rows
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("User", id))
    }

    fn username_taken(&self, username: &str, except: Option<&str>) -> bool {
        self.rows
            .values()
            .any(|u| u.username == username && Some(u.id.as_str()) != except)
    }

    fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id.as_str()) != except)
    }

    fn doctor_link_taken(&self, doctor_id: &str, except: Option<&str>) -> bool {
        self.rows.values().any(|u| {
            u.is_active
                && u.linked_doctor_id.as_deref() == Some(doctor_id)
                && Some(u.id.as_str()) != except
        })
    }
}

fn clean_username(username: &str) -> StoreResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(StoreError::Validation("username is required".into()));
    }
    Ok(username.to_string())
}

fn clean_email(email: &str) -> StoreResult<String> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err(StoreError::Validation("a valid email is required".into()));
    }
    Ok(email)
}

/// Enforce `role == Doctor <=> linked_doctor_id.is_some()`.
fn resolve_link(role: Role, linked_doctor_id: Option<String>) -> StoreResult<Option<String>> {
    match role {
        Role::Doctor => match linked_doctor_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Ok(Some(id)),
            None => Err(StoreError::Validation(
                "doctor accounts require a linked doctor id".into(),
            )),
        },
        _ => Ok(None),
    }
}

impl CredentialStore for UserTable {
    fn find_by_username(&self, username: &str) -> StoreResult<User> {
        self.rows
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| StoreError::not_found("User", username))
    }

    fn find_by_id(&self, id: &str) -> StoreResult<User> {
        self.rows
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("User", id))
    }

    fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.rows.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        users
    }

    fn create(&mut self, fields: NewUser) -> StoreResult<User> {
        let username = clean_username(&fields.username)?;
        let email = clean_email(&fields.email)?;
        let linked_doctor_id = resolve_link(fields.role, fields.linked_doctor_id)?;

        if self.username_taken(&username, None) || self.email_taken(&email, None) {
            return Err(StoreError::Conflict("username or email already exists".into()));
        }
        if let Some(doctor_id) = &linked_doctor_id {
            if self.doctor_link_taken(doctor_id, None) {
                return Err(StoreError::Conflict(
                    "doctor is already linked to an active user".into(),
                ));
            }
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash: fields.password_hash,
            role: fields.role,
            linked_doctor_id,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        };
        self.rows.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update_fields(&mut self, id: &str, update: UserUpdate) -> StoreResult<User> {
        let current = self.find_by_id(id)?;

        let username = match update.username {
            Some(name) => clean_username(&name)?,
            None => current.username.clone(),
        };
        let email = match update.email {
            Some(email) => clean_email(&email)?,
            None => current.email.clone(),
        };
        let role = update.role.unwrap_or(current.role);
        let link = update.linked_doctor_id.or_else(|| current.linked_doctor_id.clone());
        let linked_doctor_id = resolve_link(role, link)?;

        if self.username_taken(&username, Some(id)) {
            return Err(StoreError::Conflict("username already exists".into()));
        }
        if self.email_taken(&email, Some(id)) {
            return Err(StoreError::Conflict("email already exists".into()));
        }
        if let Some(doctor_id) = &linked_doctor_id {
            if current.is_active && self.doctor_link_taken(doctor_id, Some(id)) {
                return Err(StoreError::Conflict(
                    "doctor is already linked to an active user".into(),
                ));
            }
        }

        let user = self.get_mut(id)?;
        user.username = username;
        user.email = email;
        user.role = role;
        user.linked_doctor_id = linked_doctor_id;
        Ok(user.clone())
    }

    fn set_password(&mut self, id: &str, new_hash: String) -> StoreResult<()> {
        self.get_mut(id)?.password_hash = new_hash;
        Ok(())
    }

    fn deactivate(&mut self, id: &str) -> StoreResult<User> {
        let user = self.get_mut(id)?;
        user.is_active = false;
        Ok(user.clone())
    }

    fn reactivate(&mut self, id: &str) -> StoreResult<User> {
        let current = self.find_by_id(id)?;
        if let Some(doctor_id) = &current.linked_doctor_id {
            if !current.is_active && self.doctor_link_taken(doctor_id, Some(id)) {
                return Err(StoreError::Conflict(
                    "doctor is already linked to an active user".into(),
                ));
            }
        }

        let user = self.get_mut(id)?;
        user.is_active = true;
        Ok(user.clone())
    }

    fn delete(&mut self, id: &str) -> StoreResult<()> {
        self.rows
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("User", id))
    }

    fn touch_last_login(&mut self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        self.get_mut(id)?.last_login = Some(at);
        Ok(())
    }
}
