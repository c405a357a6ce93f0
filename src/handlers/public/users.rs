use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password;
use crate::database::models::user::validate_email;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Registration and login payload: both endpoints take the same pair.
/// Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Parses the pair out of an arbitrary body. A missing or non-JSON
    /// body arrives here as Null and fails with the same 400 as a missing
    /// field would.
    fn from_json(payload: Value) -> Result<Self, ApiError> {
        serde_json::from_value(payload)
            .map_err(|e| ApiError::validation(format!("invalid request body: {}", e)))
    }
}

/// POST /users - Register a new account and open its first session
///
/// Validation runs as explicit stages: shape, email format, password
/// policy, then hash and persist. The store enforces email uniqueness.
pub async fn register(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let payload = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let input = Credentials::from_json(payload)?;

    let email = input.email.trim();
    validate_email(email).map_err(|reason| ApiError::validation(reason))?;
    password::validate_password(&input.password).map_err(|reason| ApiError::validation(reason))?;

    let password_hash = password::hash_password(&input.password)?;
    let user = state.store.create_user(User::new(email, password_hash)).await?;
    let token = state.sessions.issue(&user).await?;

    tracing::info!("registered user {}", user.id);
    Ok(Json(json!({ "user": user, "token": token })))
}

/// POST /users/login - Open a new session for an existing account
///
/// A wrong email and a wrong password fail identically so the response
/// never confirms whether an address is registered.
pub async fn login(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let payload = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let input = Credentials::from_json(payload)?;

    let user = state
        .store
        .find_user_by_email(input.email.trim())
        .await?
        .ok_or_else(|| ApiError::validation("unable to login"))?;

    if !password::verify_password(&input.password, &user.password_hash)? {
        tracing::debug!("failed login for user {}", user.id);
        return Err(ApiError::validation("unable to login"));
    }

    let token = state.sessions.issue(&user).await?;
    Ok(Json(json!({ "user": user, "token": token })))
}
