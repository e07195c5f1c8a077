use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::{Map, Value};

use super::serializer;
use super::store::{SnippetStore, SnippetUpdate};
use crate::auth::Principal;
use crate::error::{ApiError, Result};
use crate::handler::AppState;
use crate::highlight;
use crate::model::SnippetOut;
use crate::permission;

/// Unwraps the request body as a JSON object, mapping parse failures
/// and non-object payloads to a 400.
fn json_object(payload: std::result::Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>> {
    let Json(body) = payload.map_err(|e| ApiError::Malformed(e.to_string()))?;
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::Malformed("expected a JSON object".to_string())),
    }
}

pub async fn list_snippets(State(state): State<AppState>) -> Result<Response> {
    let store = SnippetStore::new(&state.db);
    let snippets = store.list().await?;
    let out: Vec<SnippetOut> = snippets.iter().map(SnippetOut::from).collect();
    Ok(Json(out).into_response())
}

pub async fn create_snippet(
    State(state): State<AppState>,
    principal: Principal,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    // authorization is checked before the body is even looked at
    let user = principal.require_authenticated()?.clone();

    let body = json_object(payload)?;
    let input = serializer::validate_create(&body).map_err(ApiError::Validation)?;

    let store = SnippetStore::new(&state.db);
    let snippet = store.create(&input, user.id).await?;
    // stand-in for the notification side effect, intentionally a no-op
    tracing::debug!(id = snippet.id, owner = %user.username, "snippet created, sending email");

    Ok((StatusCode::CREATED, Json(SnippetOut::from(&snippet))).into_response())
}

pub async fn get_snippet(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response> {
    let store = SnippetStore::new(&state.db);
    match store.get(id).await? {
        Some(snippet) => Ok(Json(SnippetOut::from(&snippet)).into_response()),
        None => Err(ApiError::not_found("snippet")),
    }
}

pub async fn update_snippet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    principal: Principal,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Response> {
    let store = SnippetStore::new(&state.db);
    let snippet = store.get(id).await?.ok_or(ApiError::not_found("snippet"))?;

    principal.require_authenticated()?;
    if !permission::may_modify(&principal, Some(snippet.owner_id), true) {
        return Err(ApiError::Forbidden);
    }

    // the store re-reads and merges under its transaction lock, the
    // snippet fetched above is only for the 404 and ownership checks
    let body = json_object(payload)?;
    match store.update(id, &body).await? {
        SnippetUpdate::Updated(updated) => Ok(Json(SnippetOut::from(&updated)).into_response()),
        SnippetUpdate::NotFound => Err(ApiError::not_found("snippet")),
        SnippetUpdate::Invalid(errors) => Err(ApiError::Validation(errors)),
    }
}

pub async fn delete_snippet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    principal: Principal,
) -> Result<Response> {
    let store = SnippetStore::new(&state.db);
    let snippet = store.get(id).await?.ok_or(ApiError::not_found("snippet"))?;

    principal.require_authenticated()?;
    if !permission::may_modify(&principal, Some(snippet.owner_id), true) {
        return Err(ApiError::Forbidden);
    }

    tracing::debug!(id = snippet.id, "running pre-delete checks");
    if !store.delete(id).await? {
        return Err(ApiError::not_found("snippet"));
    }

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Read-only, no permission check: renders the snippet through the
/// highlighter and returns fixed HTML instead of JSON.
pub async fn highlight_snippet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let store = SnippetStore::new(&state.db);
    let snippet = store.get(id).await?.ok_or(ApiError::not_found("snippet"))?;

    let html = highlight::render(
        &snippet.code,
        &snippet.language,
        &snippet.style,
        snippet.linenos,
    )?;
    Ok(Html(html).into_response())
}
