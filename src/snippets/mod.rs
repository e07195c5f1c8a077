//! Snippets Module
//!
//! The pastebin core: CRUD over code snippets plus a read-only endpoint
//! serving a syntax-highlighted HTML rendering of a snippet's contents.
//!
//! Mutations are permission-checked (create needs an authenticated
//! principal, update/delete need the owner) and validated against the
//! explicit field contract in [`serializer`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use snipbin::snippets;
//!
//! let app = Router::new()
//!     .nest("/snippets", snippets::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;
pub mod serializer;
mod store;

pub use routes::routes;
pub use store::SnippetStore;

/// Returns the migrations for the snippets module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "snippets_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
