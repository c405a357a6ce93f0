use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::Value;

use crate::auth::password;
use crate::database::models::user::validate_email;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::AuthSession;
use crate::state::AppState;

/// POST /users/logout - End the current session
///
/// Revokes exactly the token this request authenticated with; other
/// sessions stay alive.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<StatusCode, ApiError> {
    state.sessions.revoke(&session.user, &session.token).await?;
    Ok(StatusCode::OK)
}

/// POST /users/logoutAll - End every session for this account
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<StatusCode, ApiError> {
    state.sessions.revoke_all(&session.user).await?;
    Ok(StatusCode::OK)
}

/// GET /users/me - The authenticated user's own view
pub async fn me(Extension(session): Extension<AuthSession>) -> Json<User> {
    Json(session.user)
}

/// PATCH /users/me - Change email and/or password
///
/// Only those two fields are patchable; any other key is a 400 naming the
/// field. A password change re-validates the policy and re-hashes, and
/// deliberately leaves existing sessions alive.
pub async fn me_update(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    body: Option<Json<Value>>,
) -> Result<Json<User>, ApiError> {
    let payload = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let object = payload
        .as_object()
        .ok_or_else(|| ApiError::validation("invalid request body: expected a JSON object"))?;

    let mut user = session.user;
    for (key, value) in object {
        match key.as_str() {
            "email" => {
                let email = value
                    .as_str()
                    .ok_or_else(|| ApiError::validation("email must be a string"))?
                    .trim();
                validate_email(email).map_err(|reason| ApiError::validation(reason))?;
                user.email = email.to_string();
            }
            "password" => {
                let password = value
                    .as_str()
                    .ok_or_else(|| ApiError::validation("password must be a string"))?;
                password::validate_password(password).map_err(|reason| ApiError::validation(reason))?;
                user.password_hash = password::hash_password(password)?;
            }
            other => {
                return Err(ApiError::validation(format!("field '{}' cannot be updated", other)));
            }
        }
    }

    state
        .store
        .update_user(user.id, &user.email, &user.password_hash)
        .await?;
    Ok(Json(user))
}

/// DELETE /users/me - Delete the account and everything it owns
///
/// Owned to-dos cascade; the response carries the deleted user's view.
pub async fn me_delete(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<User>, ApiError> {
    state.store.delete_user(session.user.id).await?;
    tracing::info!("deleted user {}", session.user.id);
    Ok(Json(session.user))
}
