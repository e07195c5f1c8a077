//! Principal extraction.
//!
//! Requests authenticate with `Authorization: Bearer <token>`, where the
//! token was handed out at registration. A missing header resolves to an
//! anonymous principal; an unknown or malformed credential is rejected.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::handler::AppState;
use crate::users::UserStore;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

/// The acting principal of a request. Every handler that needs to know
/// who is calling takes this explicitly, there is no ambient user state.
#[derive(Debug, Clone)]
pub enum Principal {
    Anonymous,
    User(AuthUser),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Principal::User(user) => Some(user),
            Principal::Anonymous => None,
        }
    }

    /// The authenticated user, or `Unauthenticated` (HTTP 401).
    pub fn require_authenticated(&self) -> Result<&AuthUser, ApiError> {
        self.user().ok_or(ApiError::Unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Principal::Anonymous);
        };

        let value = value.to_str().map_err(|_| ApiError::Unauthenticated)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        let store = UserStore::new(&state.db);
        match store.find_by_token(token).await {
            Ok(Some(user)) => Ok(Principal::User(AuthUser {
                id: user.id,
                username: user.username,
            })),
            Ok(None) => Err(ApiError::Unauthenticated),
            Err(e) => Err(ApiError::Internal(e)),
        }
    }
}

/// Mints an opaque bearer token for a new user.
pub fn mint_token(username: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(chrono::Utc::now().to_rfc3339().as_bytes());
    hex::encode(hasher.finalize())
}
