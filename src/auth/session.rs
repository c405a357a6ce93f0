use std::sync::Arc;

use thiserror::Error;

use crate::database::models::User;
use crate::database::{Store, StoreError};

use super::token::{self, Claims, TokenError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues, revokes, and resolves session tokens. A token is only as alive
/// as its membership in the owning user's active set: a verified signature
/// alone never authenticates.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn Store>,
    secret: String,
}

impl SessionManager {
    pub fn new(store: Arc<dyn Store>, secret: impl Into<String>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    /// Signs a fresh token for the user and appends it to the active set.
    pub async fn issue(&self, user: &User) -> Result<String, SessionError> {
        let token = token::sign(&Claims::new(user.id), &self.secret)?;
        self.store.push_token(user.id, &token).await?;
        Ok(token)
    }

    /// Removes one token from the active set; revoking a token that is not
    /// present is a no-op, not an error.
    pub async fn revoke(&self, user: &User, token: &str) -> Result<(), SessionError> {
        self.store.remove_token(user.id, token).await?;
        Ok(())
    }

    /// Clears the active set, ending every session at once.
    pub async fn revoke_all(&self, user: &User) -> Result<(), SessionError> {
        self.store.clear_tokens(user.id).await?;
        Ok(())
    }

    /// Resolves a presented token to its user. Any verification failure
    /// (bad signature, malformed input, unknown subject, revoked token)
    /// resolves to None; only a storage failure is an error.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, SessionError> {
        let claims = match token::verify(token, &self.secret) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("token rejected: {}", e);
                return Ok(None);
            }
        };

        // Single lookup checks subject existence and membership together
        let user = self.store.find_user_by_token(claims.sub, token).await?;
        Ok(user)
    }
}
