// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with exactly one deployment secret. They
//! carry the subject and validity window only; role and active flag are
//! re-read from the credential store on every request. Rotating the secret
//! invalidates every outstanding token.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;

/// Why a token was rejected. Kept distinct for logs; callers only ever see
/// `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenConfigError {
    #[error("token signing secret is empty")]
    EmptySecret,
    #[error("token ttl must be positive, got {0}s")]
    InvalidTtl(i64),
    #[error("token leeway must not be negative, got {0}s")]
    InvalidLeeway(i64),
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.claims.exp, 0).unwrap_or_default()
    }
}

/// Stateless token service. Cheap to share behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
    leeway: Duration,
}

impl TokenService {
    /// Create a service from the single signing secret.
    ///
    /// An empty secret is a startup error, never a per-request one.
    pub fn new(secret: &str, ttl_seconds: i64, leeway_seconds: i64) -> Result<Self, TokenConfigError> {
        if secret.trim().is_empty() {
            return Err(TokenConfigError::EmptySecret);
        }
        if ttl_seconds <= 0 {
            return Err(TokenConfigError::InvalidTtl(ttl_seconds));
        }
        if leeway_seconds < 0 {
            return Err(TokenConfigError::InvalidLeeway(leeway_seconds));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl: Duration::seconds(ttl_seconds),
            leeway: Duration::seconds(leeway_seconds),
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `user_id` valid for `ttl` from now.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let claims = SessionClaims::new(user_id, now, ttl);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, claims })
    }

    /// Verify a token against the current clock.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as of `now`.
    ///
    /// Order: structure (`Malformed`), integrity (`BadSignature`), then
    /// expiry (`Expired`). A token is expired once `now >= exp + leeway`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        check_structure(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = ["exp", "sub"].into_iter().map(String::from).collect();

        // Structure is known-good at this point, so any decode failure is an
        // integrity failure of signature, algorithm or signed content.
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::BadSignature)?
            .claims;

        if now.timestamp() >= claims.exp + self.leeway.num_seconds() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Three base64url segments, a JSON object header and parseable claims.
fn check_structure(token: &str) -> Result<(), TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(TokenError::Malformed);
    };

    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(TokenError::Malformed);
    }

    let header_bytes = Base64UrlUnpadded::decode_vec(header).map_err(|_| TokenError::Malformed)?;
    let header_json: serde_json::Value =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    if !header_json.get("alg").is_some_and(|alg| alg.is_string()) {
        return Err(TokenError::Malformed);
    }

    let payload_bytes = Base64UrlUnpadded::decode_vec(payload).map_err(|_| TokenError::Malformed)?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;
    if claims.sub.is_empty() {
        return Err(TokenError::Malformed);
    }

    Ok(())
}
