use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::{Todo, TodoDraft};
use crate::error::ApiError;
use crate::middleware::AuthSession;
use crate::state::AppState;

/// POST /todos - Create a to-do owned by the authenticated user
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    body: Option<Json<Value>>,
) -> Result<Json<Todo>, ApiError> {
    let payload = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let draft: TodoDraft = serde_json::from_value(payload)
        .map_err(|e| ApiError::validation(format!("invalid request body: {}", e)))?;

    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("title must not be empty"));
    }

    let todo = Todo::new(session.user.id, title, draft.completed, draft.date);
    let todo = state.store.create_todo(todo).await?;
    Ok(Json(todo))
}

/// GET /todos - The authenticated user's to-dos in creation order
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.store.list_todos(session.user.id).await?;
    Ok(Json(todos))
}

/// GET /todos/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_todo_id(&id)?;
    let todo = state
        .store
        .find_todo(session.user.id, id)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(todo))
}

/// PATCH /todos/:id - Partial update; `date: null` clears the due date
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_todo_id(&id)?;
    let payload = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let patch = Todo::parse_patch(&payload).map_err(|reason| ApiError::validation(reason))?;

    let todo = state
        .store
        .update_todo(session.user.id, id, patch)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(todo))
}

/// DELETE /todos/:id - Delete and return the to-do
pub async fn remove(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_todo_id(&id)?;
    let todo = state
        .store
        .delete_todo(session.user.id, id)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok(Json(todo))
}

// An unparseable id cannot name an owned record, so it reads as "not
// found" rather than leaking that the path was malformed vs missing.
fn parse_todo_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found())
}
