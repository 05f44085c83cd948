// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Optional HTTPS termination via rustls.

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsPaths;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to install rustls crypto provider")]
    Provider,
    #[error("failed to load TLS certificate/key from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Install the ring provider. Must run before any TLS config is built;
/// a second call is a no-op.
pub fn install_crypto_provider() -> Result<(), TlsError> {
    // Losing an install race to another thread is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();
    match rustls::crypto::CryptoProvider::get_default() {
        Some(_) => Ok(()),
        None => Err(TlsError::Provider),
    }
}

/// Load the PEM certificate chain and private key.
pub async fn load_rustls_config(paths: &TlsPaths) -> Result<RustlsConfig, TlsError> {
    install_crypto_provider()?;
    RustlsConfig::from_pem_file(&paths.cert, &paths.key)
        .await
        .map_err(|source| TlsError::Load {
            path: paths.cert.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_install_is_idempotent() {
        install_crypto_provider().unwrap();
        install_crypto_provider().unwrap();
    }

    #[tokio::test]
    async fn missing_files_are_reported() {
        let paths = TlsPaths {
            cert: "/nonexistent/cert.pem".into(),
            key: "/nonexistent/key.pem".into(),
        };
        let err = load_rustls_config(&paths).await.unwrap_err();
        assert!(matches!(err, TlsError::Load { .. }));
        assert!(err.to_string().contains("/nonexistent/cert.pem"));
    }
}
