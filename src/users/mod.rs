//! Users Module
//!
//! Minimal principal store for the snippet API: registration hands out
//! an opaque bearer token, and the read-only list/detail views expose
//! each user's username together with the ids of the snippets they own.
//!
//! # Usage
//!
//! ```rust,ignore
//! use snipbin::users;
//!
//! let app = Router::new()
//!     .nest("/users", users::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;
mod store;

pub use routes::routes;
pub use store::UserStore;

/// Returns the migrations for the users module. Must run before the
/// snippets migrations, which reference the users table.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[("users_001_schema.sql", include_str!("migrations/001_schema.sql"))]
}
