// Durable storage behind an opaque trait: user records with their active
// session tokens, plus per-owner to-do records.
pub mod memory;
pub mod models;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use models::{Todo, TodoPatch, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already in use")]
    DuplicateEmail,

    #[error("user record missing")]
    UserMissing,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Storage contract shared by the in-memory and Postgres backends.
///
/// Token mutations and lookups are atomic with respect to the user record
/// they touch, so concurrent logins, logouts, and resolutions never observe
/// a half-applied token set.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persists a new user, enforcing email uniqueness.
    async fn create_user(&self, user: User) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Looks up a user by id AND membership of `token` in its active set, in
    /// a single query. Returns None when either check fails.
    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, StoreError>;

    /// Persists email and password-hash changes. Token mutations go through
    /// the dedicated token operations below.
    async fn update_user(&self, id: Uuid, email: &str, password_hash: &str) -> Result<(), StoreError>;

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), StoreError>;

    /// Removes one matching token; a no-op when the token (or the user
    /// itself) is already gone.
    async fn remove_token(&self, id: Uuid, token: &str) -> Result<(), StoreError>;

    async fn clear_tokens(&self, id: Uuid) -> Result<(), StoreError>;

    /// Deletes the user and cascades to owned to-dos. Idempotent.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;

    async fn create_todo(&self, todo: Todo) -> Result<Todo, StoreError>;

    /// All of `owner`'s to-dos in creation order.
    async fn list_todos(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError>;

    async fn find_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Applies a partial update; None when no to-do matches owner and id.
    async fn update_todo(&self, owner: Uuid, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError>;

    /// Deletes and returns the to-do; None when no match.
    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Selects the backend from configuration: Postgres when a URL is set,
/// otherwise the ephemeral in-memory store.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, StoreError> {
    match &config.url {
        Some(url) => {
            let store = postgres::PostgresStore::connect(url, config).await?;
            tracing::info!("connected to postgres store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory store (data is ephemeral)");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
    }
}
