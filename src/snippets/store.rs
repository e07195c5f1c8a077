use anyhow::Result;
use libsql::Row;
use serde_json::{Map, Value};

use super::serializer::{self, SnippetInput};
use crate::db::Database;
use crate::error::FieldErrors;
use crate::model::Snippet;

const SNIPPET_COLUMNS: &str = r#"
    snippets.id,
    snippets.title,
    snippets.code,
    snippets.linenos,
    snippets.language,
    snippets.style,
    snippets.owner_id,
    users.username,
    snippets.created_at
"#;

/// Outcome of a partial update.
#[derive(Debug)]
pub enum SnippetUpdate {
    Updated(Snippet),
    NotFound,
    Invalid(FieldErrors),
}

pub struct SnippetStore<'a> {
    db: &'a Database,
}

impl<'a> SnippetStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn row_to_snippet(&self, row: &Row) -> Result<Snippet> {
        Ok(Snippet {
            id: row.get(0)?,
            title: row.get(1)?,
            code: row.get(2)?,
            linenos: row.get::<i64>(3)? != 0,
            language: row.get(4)?,
            style: row.get(5)?,
            owner_id: row.get(6)?,
            owner: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    /// Every snippet, in insertion order.
    pub async fn list(&self) -> Result<Vec<Snippet>> {
        let query = format!(
            r#"
            SELECT {SNIPPET_COLUMNS}
            FROM snippets
            JOIN users ON users.id = snippets.owner_id
            ORDER BY snippets.id
            "#
        );

        let mut rows = self.db.connection().query(&query, ()).await?;
        let mut snippets = vec![];
        while let Some(row) = rows.next().await? {
            snippets.push(self.row_to_snippet(&row)?);
        }
        Ok(snippets)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Snippet>> {
        let query = format!(
            r#"
            SELECT {SNIPPET_COLUMNS}
            FROM snippets
            JOIN users ON users.id = snippets.owner_id
            WHERE snippets.id = ?
            "#
        );

        let mut rows = self
            .db
            .connection()
            .query(&query, libsql::params![id])
            .await?;
        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_snippet(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Persists a new snippet. The owner comes from the authenticated
    /// principal, never from the payload.
    pub async fn create(&self, input: &SnippetInput, owner_id: i64) -> Result<Snippet> {
        let query = r#"
            INSERT INTO snippets (title, code, linenos, language, style, owner_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
        "#;

        let mut rows = self
            .db
            .connection()
            .query(
                query,
                libsql::params![
                    input.title.as_str(),
                    input.code.as_str(),
                    input.linenos as i64,
                    input.language.as_str(),
                    input.style.as_str(),
                    owner_id
                ],
            )
            .await?;

        let id: i64 = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            anyhow::bail!("failed to create snippet")
        };

        match self.get(id).await? {
            Some(snippet) => Ok(snippet),
            None => anyhow::bail!("created snippet {} not found", id),
        }
    }

    /// Applies a partial update: reads the current row, merges and
    /// validates the payload against it, and writes the result. The
    /// whole read-merge-write sequence holds the store transaction
    /// lock, so a concurrent update to the same id cannot resurrect
    /// values this one replaces.
    pub async fn update(&self, id: i64, body: &Map<String, Value>) -> Result<SnippetUpdate> {
        let _guard = self.db.tx_guard().await;

        let Some(current) = self.get(id).await? else {
            return Ok(SnippetUpdate::NotFound);
        };
        let input = match serializer::validate_update(body, &current) {
            Ok(input) => input,
            Err(errors) => return Ok(SnippetUpdate::Invalid(errors)),
        };

        let affected = self
            .db
            .connection()
            .execute(
                r#"
                UPDATE snippets
                SET title = ?, code = ?, linenos = ?, language = ?, style = ?
                WHERE id = ?
                "#,
                libsql::params![
                    input.title.as_str(),
                    input.code.as_str(),
                    input.linenos as i64,
                    input.language.as_str(),
                    input.style.as_str(),
                    id
                ],
            )
            .await?;

        if affected == 0 {
            return Ok(SnippetUpdate::NotFound);
        }
        match self.get(id).await? {
            Some(snippet) => Ok(SnippetUpdate::Updated(snippet)),
            None => Ok(SnippetUpdate::NotFound),
        }
    }

    /// Removes a snippet permanently. Returns false if it was absent.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let _guard = self.db.tx_guard().await;

        let affected = self
            .db
            .connection()
            .execute("DELETE FROM snippets WHERE id = ?", libsql::params![id])
            .await?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserStore;
    use serde_json::json;

    async fn setup() -> (Database, i64) {
        let db = Database::in_memory().await.unwrap();
        let user = UserStore::new(&db).create("amy").await.unwrap();
        (db, user.id)
    }

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn input(code: &str) -> SnippetInput {
        SnippetInput {
            title: String::new(),
            code: code.to_string(),
            linenos: false,
            language: "python".to_string(),
            style: "friendly".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let (db, owner_id) = setup().await;
        let store = SnippetStore::new(&db);

        let created = store.create(&input("x = 1"), owner_id).await.unwrap();
        assert_eq!(created.owner, "amy");
        assert_eq!(created.owner_id, owner_id);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.code, "x = 1");
        assert_eq!(fetched.title, "");
        assert!(!fetched.linenos);
        assert_eq!(fetched.language, "python");
        assert_eq!(fetched.style, "friendly");
        assert_eq!(fetched.owner, "amy");
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let (db, owner_id) = setup().await;
        let store = SnippetStore::new(&db);

        let first = store.create(&input("a"), owner_id).await.unwrap();
        let second = store.create(&input("b"), owner_id).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(
            all.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }

    fn updated(outcome: SnippetUpdate) -> Snippet {
        match outcome {
            SnippetUpdate::Updated(snippet) => snippet,
            other => panic!("expected an updated snippet, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let (db, owner_id) = setup().await;
        let store = SnippetStore::new(&db);

        let created = store.create(&input("x = 1"), owner_id).await.unwrap();
        let change = body(json!({ "title": "renamed", "code": "y = 2" }));

        let once = updated(store.update(created.id, &change).await.unwrap());
        let twice = updated(store.update(created.id, &change).await.unwrap());
        assert_eq!(once.code, twice.code);
        assert_eq!(once.title, twice.title);
        assert_eq!(once.id, twice.id);
        assert_eq!(twice.code, "y = 2");
        // owner and created timestamp are immutable
        assert_eq!(twice.owner_id, owner_id);
        assert_eq!(twice.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_merges_from_the_row_it_locks() {
        let (db, owner_id) = setup().await;
        let store = SnippetStore::new(&db);
        let created = store.create(&input("v1"), owner_id).await.unwrap();

        // Two updates to the same snippet touching disjoint fields.
        // Whatever order they land in, each must merge from the row as
        // its predecessor left it, so neither write may be lost.
        let title_change = body(json!({ "title": "renamed" }));
        let code_change = body(json!({ "code": "v2" }));
        let (first, second) = tokio::join!(
            store.update(created.id, &title_change),
            store.update(created.id, &code_change),
        );
        updated(first.unwrap());
        updated(second.unwrap());

        let merged = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(merged.title, "renamed");
        assert_eq!(merged.code, "v2");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (db, _) = setup().await;
        let store = SnippetStore::new(&db);
        let outcome = store.update(404, &body(json!({ "code": "x" }))).await.unwrap();
        assert!(matches!(outcome, SnippetUpdate::NotFound));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_fields() {
        let (db, owner_id) = setup().await;
        let store = SnippetStore::new(&db);
        let created = store.create(&input("x = 1"), owner_id).await.unwrap();

        let outcome = store
            .update(created.id, &body(json!({ "language": "cobol" })))
            .await
            .unwrap();
        match outcome {
            SnippetUpdate::Invalid(errors) => {
                assert!(errors["language"][0].contains("cobol"));
            }
            other => panic!("expected a validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_then_get_is_absent() {
        let (db, owner_id) = setup().await;
        let store = SnippetStore::new(&db);

        let created = store.create(&input("gone"), owner_id).await.unwrap();
        assert!(store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
        assert!(!store.delete(created.id).await.unwrap());
    }
}
