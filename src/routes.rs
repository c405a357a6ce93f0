use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_public_routes())
        // Protected (bearer token required)
        .merge(user_routes(state.clone()))
        .merge(todo_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_public_routes() -> Router<AppState> {
    use public::users;

    Router::new()
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
}

fn user_routes(state: AppState) -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users/logout", post(users::logout))
        .route("/users/logoutAll", post(users::logout_all))
        .route(
            "/users/me",
            get(users::me).patch(users::me_update).delete(users::me_delete),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

fn todo_routes(state: AppState) -> Router<AppState> {
    use protected::todos;

    Router::new()
        .route("/todos", post(todos::create).get(todos::list))
        .route(
            "/todos/:id",
            get(todos::show).patch(todos::update).delete(todos::remove),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": chrono::Utc::now(),
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "store unavailable" })),
            )
        }
    }
}
