use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Session-token claims. Tokens never expire on their own; their lifetime
/// is governed by the user's active set. The jti keeps two tokens issued
/// within the same second from being byte-identical.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub jti: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            sub: user_id,
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    EmptySecret,

    #[error("token generation failed: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token verification failed: {0}")]
    Verify(#[source] jsonwebtoken::errors::Error),
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptySecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(TokenError::Sign)
}

pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::EmptySecret);
    }

    // No exp claim to check; jsonwebtoken requires exp by default
    let mut validation = Validation::default();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(TokenError::Verify)
}
