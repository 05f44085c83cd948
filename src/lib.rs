// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clinic Auth Server - staff authentication and authorization
//!
//! Issues bearer session tokens to clinic staff, enforces the
//! admin / doctor / receptionist role model on every route and scopes
//! clinical records to the doctor a logged-in account is linked to.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Tokens, password hashing, policy and the request gate
//! - `storage` - Credential and record stores, audit events
//! - `store` - The in-memory store shared by all handlers

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
pub mod tls;
