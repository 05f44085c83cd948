// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gate.
//!
//! Every protected route is registered through [`gated`] with the
//! [`RouteAccess`] descriptor it requires. Per request the gate moves
//! through:
//!
//! ```text
//! NoToken --header?--> TokenPresent --verify--> IdentityResolved --policy--> Authorized
//!    |                      |                        |                          \--> Forbidden
//!    \----------------------+------------------------+--> Unauthenticated
//! ```
//!
//! Any failure before `Authorized` ends in `Unauthenticated` (401) or
//! `Forbidden` (403). The gate reads the credential store to resolve the
//! subject but never touches clinical data; ownership of records loaded by
//! the handler is checked through [`super::extractor::Guard`].

use axum::{
    extract::{rejection::RawPathParamsRejection, RawPathParams, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};

use super::policy::{evaluate, Decision, OwnerSource, RouteAccess};
use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;
use crate::storage::{AuditEvent, AuditEventType, CredentialStore};

/// Path parameter carrying a resource id.
pub const ID_PARAM: &str = "id";

/// Middleware state: the app state plus the route's descriptor.
#[derive(Clone)]
pub struct RouteGate {
    pub state: AppState,
    pub access: RouteAccess,
}

/// Put `route` behind the gate with `access`.
pub fn gated(route: MethodRouter<AppState>, state: &AppState, access: RouteAccess) -> MethodRouter<AppState> {
    let gate = RouteGate {
        state: state.clone(),
        access,
    };
    route.route_layer(middleware::from_fn_with_state(gate, require))
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller from the bearer token and the live user record.
///
/// Missing header, any token error, an unknown subject and an inactive
/// account all yield [`AuthError::Unauthenticated`]; the distinct reason is
/// only logged.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::Unauthenticated)?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(reason = e.as_str(), "Rejected bearer token");
        AuditEvent::new(AuditEventType::TokenRejected)
            .failed(e.as_str())
            .emit();
        AuthError::from(e)
    })?;

    let store = state.store.read().await;
    let user = match store.users.find_by_id(&claims.sub) {
        Ok(user) => user,
        Err(_) => {
            tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
            return Err(AuthError::Unauthenticated);
        }
    };

    if !user.is_active {
        tracing::debug!(user_id = %user.id, "Token subject is deactivated");
        return Err(AuthError::Unauthenticated);
    }

    Ok(AuthenticatedUser::from_user(&user))
}

/// Gate middleware. Use through [`gated`].
pub async fn require(
    State(gate): State<RouteGate>,
    path: Result<RawPathParams, RawPathParamsRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match authenticate(&gate.state, request.headers()).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    let decision = match gate.access.ownership {
        Some(OwnerSource::PathId) => {
            let owner = path
                .ok()
                .and_then(|params| params.iter().find(|(k, _)| *k == ID_PARAM).map(|(_, v)| v.to_string()));
            evaluate(Some(&user), &gate.access, owner.as_deref())
        }
        // Record owners are checked by the handler once loaded.
        Some(OwnerSource::Record) | None => evaluate(Some(&user), &gate.access.role_only(), None),
    };

    if let Decision::Deny(reason) = decision {
        tracing::debug!(user_id = %user.user_id, ?reason, path = %request.uri().path(), "Access denied");
        AuditEvent::new(AuditEventType::AccessDenied)
            .with_user(&user.user_id)
            .with_details(serde_json::json!({
                "path": request.uri().path(),
                "method": request.method().as_str(),
                "reason": reason,
            }))
            .failed("denied by policy")
            .emit();
        return AuthError::from_denial(reason, gate.access.required_roles).into_response();
    }

    request.extensions_mut().insert(gate.access);
    request.extensions_mut().insert(user);
    next.run(request).await
}
