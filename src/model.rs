use serde::{Deserialize, Serialize};

/// A snippet row joined with its owner's username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: String,
    pub style: String,
    pub owner_id: i64,
    pub owner: String,
    pub created_at: String,
}

/// The serialized snippet shape returned by the API. `owner` is the
/// owner's username and is read-only; `highlight` links to the rendered
/// HTML view of the snippet.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnippetOut {
    pub id: i64,
    pub highlight: String,
    pub owner: String,
    pub title: String,
    pub code: String,
    pub linenos: bool,
    pub language: String,
    pub style: String,
}

impl From<&Snippet> for SnippetOut {
    fn from(snippet: &Snippet) -> Self {
        SnippetOut {
            id: snippet.id,
            highlight: format!("/snippets/{}/highlight", snippet.id),
            owner: snippet.owner.clone(),
            title: snippet.title.clone(),
            code: snippet.code.clone(),
            linenos: snippet.linenos,
            language: snippet.language.clone(),
            style: snippet.style.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

/// Serialized user shape: username plus the ids of the snippets the
/// user owns. The bearer token is never included here.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
    pub snippets: Vec<i64>,
}

/// Returned once, on registration only.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}
