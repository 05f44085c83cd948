// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Salted, deliberately slow password hashing (Argon2id).
//!
//! Digests are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`),
//! so verification reads algorithm, cost and salt from the digest itself.
//! Hashing is CPU-expensive; request handlers go through the `*_blocking`
//! async wrappers, which run on tokio's blocking pool.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password must not be empty")]
    Empty,
    #[error("invalid hashing parameters: {0}")]
    Params(String),
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("hashing worker failed: {0}")]
    Worker(String),
}

/// Argon2id hasher shared across requests.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Digest of a random secret, verified against when a login names an
    /// unknown user so both paths cost the same.
    dummy_digest: Arc<str>,
}

impl PasswordHasher {
    /// Build a hasher with explicit Argon2id cost parameters.
    pub fn new(params: Params) -> Result<Self, PasswordError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let filler = uuid::Uuid::new_v4().to_string();
        let salt = SaltString::generate(&mut OsRng);
        let dummy = argon2
            .hash_password(filler.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?
            .to_string();

        Ok(Self {
            argon2,
            dummy_digest: Arc::from(dummy),
        })
    }

    /// Hasher with the argon2 crate's recommended defaults.
    pub fn with_default_params() -> Result<Self, PasswordError> {
        Self::new(Params::default())
    }

    /// Hasher with custom cost (`memory_kib`, `iterations`, `parallelism`).
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Self::new(params)
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.trim().is_empty() {
            return Err(PasswordError::Empty);
        }

        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Verify a plaintext against a stored digest.
    ///
    /// Uses the parameters embedded in `digest`; the digest comparison is
    /// constant-time. A malformed digest yields `false`.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Burn one verification against the dummy digest. Always `false`.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = self.verify(plaintext, &self.dummy_digest);
        false
    }

    /// [`hash`](Self::hash) on the blocking pool.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Worker(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking pool. `None` digest runs the
    /// dummy verification instead.
    pub async fn verify_blocking(&self, plaintext: String, digest: Option<String>) -> bool {
        let hasher = self.clone();
        let outcome = tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&plaintext, &digest),
            None => hasher.verify_dummy(&plaintext),
        })
        .await;

        match outcome {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!(error = %e, "Password verification worker failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::with_cost(1024, 1, 1).expect("cheap test params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrips() {
        let hasher = test_hasher();
        let digest = hasher.hash("admin123").unwrap();
        assert!(hasher.verify("admin123", &digest));
        assert!(!hasher.verify("admin124", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn digest_is_self_describing_and_salted() {
        let hasher = test_hasher();
        let a = hasher.hash("secret").unwrap();
        let b = hasher.hash("secret").unwrap();
        assert!(a.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert_ne!(a, b);
    }

    #[test]
    fn verify_uses_embedded_parameters() {
        let cheap = test_hasher();
        let other = PasswordHasher::with_cost(2048, 2, 1).unwrap();
        let digest = other.hash("secret").unwrap();
        assert!(cheap.verify("secret", &digest));
    }

    #[test]
    fn malformed_digest_is_false_not_panic() {
        let hasher = test_hasher();
        assert!(!hasher.verify("secret", ""));
        assert!(!hasher.verify("secret", "not-a-phc-string"));
        assert!(!hasher.verify("secret", "$2a$10$abcdefghijklmnopqrstuv"));
    }

    #[test]
    fn empty_password_is_rejected() {
        let hasher = test_hasher();
        assert!(matches!(hasher.hash("   "), Err(PasswordError::Empty)));
    }

    #[test]
    fn dummy_verification_never_succeeds() {
        let hasher = test_hasher();
        assert!(!hasher.verify_dummy("anything"));
    }

    #[tokio::test]
    async fn blocking_wrappers_match_sync_results() {
        let hasher = test_hasher();
        let digest = hasher.hash_blocking("pw-1".to_string()).await.unwrap();
        assert!(hasher.verify_blocking("pw-1".to_string(), Some(digest.clone())).await);
        assert!(!hasher.verify_blocking("pw-2".to_string(), Some(digest)).await);
        assert!(!hasher.verify_blocking("pw-1".to_string(), None).await);
    }
}
