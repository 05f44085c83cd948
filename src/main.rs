// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use clinic_auth_server::{
    api::router,
    auth::{PasswordHasher, TokenService},
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    store::InMemoryStore,
    tls::load_rustls_config,
};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Build the store, creating the bootstrap admin when configured.
async fn build_store(config: &Config, passwords: &PasswordHasher) -> Result<InMemoryStore, BoxError> {
    let mut store = InMemoryStore::new();

    match &config.seed_admin {
        Some(seed) => {
            let hash = passwords.hash_blocking(seed.password.clone()).await?;
            if let Some(admin) = store.seed_admin(&seed.username, &seed.email, hash)? {
                tracing::info!(user_id = %admin.id, username = %admin.username, "Seeded bootstrap admin");
            }
        }
        None => tracing::warn!("No SEED_ADMIN_USERNAME set; the store starts without any account"),
    }

    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn run(config: Config) -> Result<(), BoxError> {
    tracing::debug!(?config, "Loaded configuration");

    let tokens = TokenService::new(
        &config.jwt_secret,
        config.token_ttl_seconds,
        config.token_leeway_seconds,
    )?;
    let passwords = PasswordHasher::with_default_params()?;
    let store = build_store(&config, &passwords).await?;

    let app = router(AppState::new(store, tokens, passwords));
    let addr = config.bind_addr()?;

    match &config.tls {
        Some(paths) => {
            let tls_config = load_rustls_config(paths).await?;
            let handle = axum_server::Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            tracing::info!(%addr, "Clinic auth server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::warn!(%addr, "TLS not configured; serving plain HTTP (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or(LogFormat::Pretty));

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
