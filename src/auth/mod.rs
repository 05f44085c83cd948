// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens, password hashing and role/ownership authorization for
//! clinic staff.
//!
//! ## Auth Flow
//!
//! 1. Staff member logs in with username and password (`POST /auth/login`)
//! 2. Server verifies the Argon2id digest and issues an HS256 session token
//! 3. Client sends `Authorization: Bearer <token>` on every request
//! 4. The request gate:
//!    - Verifies signature and expiry
//!    - Loads the user by `sub` and rejects deleted or deactivated accounts
//!    - Evaluates the route's [`policy::RouteAccess`] (role, then ownership)
//!
//! ## Security
//!
//! - Tokens carry no role; role and active flag are read live per request
//! - Every token failure looks the same to the caller (401)
//! - Role and ownership denials look the same to the caller (403)
//! - Login failures never reveal whether the username exists

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::{Auth, Guard};
pub use middleware::gated;
pub use password::PasswordHasher;
pub use roles::Role;
pub use token::{TokenError, TokenService};
