use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated request context: the resolved user plus the exact token
/// that was presented, so logout can revoke this session and no other.
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Bearer-token middleware for every protected route.
///
/// Handlers behind this layer can trust the injected AuthSession: the token
/// signature was verified and the token was still in the user's active set
/// as of this check. The 401 body is identical for a missing, malformed,
/// unknown, and revoked credential; only the logs distinguish them.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers);
    if token.is_empty() {
        tracing::debug!("rejecting request without credentials");
        return Err(ApiError::authentication());
    }

    let user = match state.sessions.resolve(&token).await? {
        Some(user) => user,
        None => {
            tracing::debug!("rejecting unresolvable token");
            return Err(ApiError::authentication());
        }
    };

    request.extensions_mut().insert(AuthSession { user, token });
    Ok(next.run(request).await)
}

/// Pulls the token out of `Authorization: Bearer <token>`. A missing or
/// unreadable header yields an empty string, which never resolves.
fn bearer_token(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|raw| raw.strip_prefix("Bearer").unwrap_or(raw).trim().to_string())
        .unwrap_or_default()
}
