// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Any error
//! here is fatal: the process exits before binding a socket.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Token signing secret | Required |
//! | `TOKEN_TTL_SECONDS` | Session token lifetime | `86400` |
//! | `TOKEN_LEEWAY_SECONDS` | Expiry tolerance | `0` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; HTTPS when both are set | unset |
//! | `SEED_ADMIN_USERNAME` / `SEED_ADMIN_PASSWORD` | Bootstrap admin on an empty store | unset |
//! | `SEED_ADMIN_EMAIL` | Bootstrap admin email | `<username>@localhost` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECONDS";
pub const TOKEN_LEEWAY_ENV: &str = "TOKEN_LEEWAY_SECONDS";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";
pub const SEED_ADMIN_USERNAME_ENV: &str = "SEED_ADMIN_USERNAME";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// 24 hours
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    PartialTls,
    #[error("SEED_ADMIN_USERNAME and SEED_ADMIN_PASSWORD must be set together")]
    PartialSeedAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub token_leeway_seconds: i64,
    pub tls: Option<TlsPaths>,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .field("tls", &self.tls)
            .field("seed_admin", &self.seed_admin)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::MissingSecret)?;

        let port = parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;
        let token_ttl_seconds = parse_or(get(TOKEN_TTL_ENV), TOKEN_TTL_ENV, DEFAULT_TOKEN_TTL_SECONDS)?;
        if token_ttl_seconds <= 0 {
            return Err(invalid(TOKEN_TTL_ENV, token_ttl_seconds));
        }
        let token_leeway_seconds = parse_or(get(TOKEN_LEEWAY_ENV), TOKEN_LEEWAY_ENV, 0_i64)?;
        if token_leeway_seconds < 0 {
            return Err(invalid(TOKEN_LEEWAY_ENV, token_leeway_seconds));
        }

        let tls = match (get(TLS_CERT_ENV), get(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let seed_admin = match (get(SEED_ADMIN_USERNAME_ENV), get(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(username), Some(password)) => {
                let email = get(SEED_ADMIN_EMAIL_ENV).unwrap_or_else(|| format!("{username}@localhost"));
                Some(SeedAdmin {
                    username,
                    password,
                    email,
                })
            }
            (None, None) => None,
            _ => return Err(ConfigError::PartialSeedAdmin),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, other)),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            jwt_secret,
            token_ttl_seconds,
            token_leeway_seconds,
            tls,
            seed_admin,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| invalid(HOST_ENV, &self.host))
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| invalid(name, value)),
    }
}

fn invalid(name: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}
