use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_snippets))
        .route("/", post(handler::create_snippet))
        .route("/:id", get(handler::get_snippet))
        .route("/:id", put(handler::update_snippet))
        .route("/:id", delete(handler::delete_snippet))
        .route("/:id/highlight", get(handler::highlight_snippet))
}
