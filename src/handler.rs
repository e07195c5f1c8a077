use std::sync::Arc;

use axum::{Json, response::IntoResponse};
use serde_json::json;
use tracing::info;

use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(json!({ "status": "ok" }))
}

/// The single entry point of the API: a fixed map from resource name to
/// its collection URL.
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "snippets": "/snippets",
        "users": "/users",
    }))
}
