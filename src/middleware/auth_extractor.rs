// src/middleware/auth_extractor.rs
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use log::{debug, error, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::post::AuthorRef;
use crate::services::auth_services::TokenVerifier;

/// The authenticated caller, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl AuthenticatedUser {
    pub fn author_ref(&self) -> AuthorRef {
        AuthorRef { id: self.user_id, username: self.username.clone() }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid header format".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Invalid auth header format".into()))?;
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
        error!("TokenVerifier is not registered as app data");
        AppError::Internal("authentication is not configured".into())
    })?;

    let token = bearer_token(req)?;
    match verifier.verify(token) {
        Ok(user) => {
            debug!("authenticated user {}", user.user_id);
            Ok(AuthenticatedUser {
                user_id: user.user_id,
                username: user.username,
                email: user.email,
            })
        }
        Err(e) => {
            warn!("auth failed: {}", e);
            Err(AppError::Unauthenticated("Invalid token".into()))
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<AuthenticatedUser, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
