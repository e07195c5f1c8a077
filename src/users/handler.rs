use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::store::UserStore;
use crate::error::{ApiError, Result};
use crate::handler::AppState;

const MAX_USERNAME_LEN: usize = 150;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
}

pub async fn list_users(State(state): State<AppState>) -> Result<Response> {
    let store = UserStore::new(&state.db);
    let users = store.list().await?;
    Ok(Json(users).into_response())
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let store = UserStore::new(&state.db);
    match store.get(id).await? {
        Some(user) => Ok(Json(user).into_response()),
        None => Err(ApiError::not_found("user")),
    }
}

pub async fn register_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(|e| ApiError::Malformed(e.to_string()))?;
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(ApiError::field_error("username", "this field is required."));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::field_error(
            "username",
            &format!(
                "ensure this field has no more than {} characters.",
                MAX_USERNAME_LEN
            ),
        ));
    }

    let store = UserStore::new(&state.db);
    match store.create(username).await {
        Ok(registered) => {
            tracing::info!(username = %registered.username, "user registered");
            Ok((StatusCode::CREATED, Json(registered)).into_response())
        }
        Err(e) if e.to_string().contains("UNIQUE") => Err(ApiError::field_error(
            "username",
            "a user with that username already exists.",
        )),
        Err(e) => Err(ApiError::Internal(e)),
    }
}
