// src/services/auth_services.rs
//
// Token verification only; issuing tokens is the auth provider's job.
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::JwtClaims;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("invalid subject in token")]
    InvalidSubject(#[from] uuid::Error),
}

/// Identity established from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// HS256 with a shared secret; `exp` is mandatory.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 30;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedUser, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)?;
        let user_id = Uuid::parse_str(&data.claims.sub)?;
        Ok(VerifiedUser {
            user_id,
            username: data.claims.username,
            email: data.claims.email,
        })
    }
}
