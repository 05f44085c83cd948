// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{password::PasswordHasher, token::TokenService};
use crate::store::InMemoryStore;

/// Shared application state. Cloned per request; everything inside is
/// either immutable or behind the store lock.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(store: InMemoryStore, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            tokens: Arc::new(tokens),
            passwords,
        }
    }
}

/// State with an empty store, a fixed secret and cheap hashing.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let tokens = TokenService::new("test-secret", 3600, 0).expect("valid token config");
    AppState::new(InMemoryStore::new(), tokens, crate::auth::password::test_hasher())
}
