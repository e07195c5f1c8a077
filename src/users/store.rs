use anyhow::Result;

use crate::auth;
use crate::db::Database;
use crate::model::{RegisteredUser, User, UserOut};

pub struct UserStore<'a> {
    db: &'a Database,
}

impl<'a> UserStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn split_snippet_ids(s: String) -> Vec<i64> {
        s.split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    }

    /// Registers a user and mints their bearer token. Surfaces the
    /// database's UNIQUE violation unchanged on duplicate usernames.
    pub async fn create(&self, username: &str) -> Result<RegisteredUser> {
        let token = auth::mint_token(username);
        let query = r#"
            INSERT INTO users (username, token)
            VALUES (?, ?)
            RETURNING id
        "#;

        let mut rows = self
            .db
            .connection()
            .query(query, libsql::params![username, token.as_str()])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(RegisteredUser {
                id: row.get(0)?,
                username: username.to_string(),
                token,
            })
        } else {
            anyhow::bail!("failed to create user {}", username)
        }
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        let query = "SELECT id, username, created_at FROM users WHERE token = ?";
        let mut rows = self
            .db
            .connection()
            .query(query, libsql::params![token])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(User {
                id: row.get(0)?,
                username: row.get(1)?,
                created_at: row.get(2)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn list(&self) -> Result<Vec<UserOut>> {
        let query = r#"
            SELECT
                users.id,
                users.username,
                GROUP_CONCAT(CAST(snippets.id AS TEXT)) as snippet_ids
            FROM users
            LEFT JOIN snippets ON snippets.owner_id = users.id
            GROUP BY users.id, users.username
            ORDER BY users.id
        "#;

        let mut rows = self.db.connection().query(query, ()).await?;
        let mut users = vec![];
        while let Some(row) = rows.next().await? {
            let snippet_ids: String = row.get::<Option<String>>(2)?.unwrap_or_default();
            users.push(UserOut {
                id: row.get(0)?,
                username: row.get(1)?,
                snippets: Self::split_snippet_ids(snippet_ids),
            });
        }
        Ok(users)
    }

    pub async fn get(&self, id: i64) -> Result<Option<UserOut>> {
        let query = r#"
            SELECT
                users.id,
                users.username,
                GROUP_CONCAT(CAST(snippets.id AS TEXT)) as snippet_ids
            FROM users
            LEFT JOIN snippets ON snippets.owner_id = users.id
            WHERE users.id = ?
            GROUP BY users.id, users.username
        "#;

        let mut rows = self
            .db
            .connection()
            .query(query, libsql::params![id])
            .await?;

        if let Some(row) = rows.next().await? {
            let snippet_ids: String = row.get::<Option<String>>(2)?.unwrap_or_default();
            Ok(Some(UserOut {
                id: row.get(0)?,
                username: row.get(1)?,
                snippets: Self::split_snippet_ids(snippet_ids),
            }))
        } else {
            Ok(None)
        }
    }
}
