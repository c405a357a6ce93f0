// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind middleware::auth_middleware and receives the
// resolved AuthSession as a request extension.
pub mod todos;
pub mod users;
