use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account. `tokens` holds the active session tokens in
/// issuance order; `password_hash` is an Argon2 PHC string.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            tokens: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

// Hand-written so the wire shape is exactly {id, email} at every call site;
// the password hash and token set must never serialize.
impl Serialize for User {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("User", 2)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("email", &self.email)?;
        state.end()
    }
}

/// Structural email check: one local part, one domain with a dot, no
/// whitespace. Returns the rejection reason for the 400 body.
pub fn validate_email(email: &str) -> Result<(), String> {
    let invalid = || "email is invalid".to_string();

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.contains(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}
