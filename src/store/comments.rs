//! Comment Storage
//! Mission: Comments live strictly under an existing parent tweet

use rusqlite::params;

use crate::models::Comment;
use crate::store::{now_iso, Db, StoreError};

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        text: row.get(1)?,
        tweet_id: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Db {
    /// Insert a comment under a tweet. The parent-existence check and the
    /// insert share a transaction, so a concurrently deleted parent can't
    /// leave an orphan behind.
    pub fn create_comment(
        &self,
        tweet_id: i64,
        user_id: i64,
        text: &str,
    ) -> Result<Comment, StoreError> {
        let created_at = now_iso();
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let parent_exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM tweets WHERE id = ?1)",
                params![tweet_id],
                |row| row.get(0),
            )?;
        if !parent_exists {
            return Err(StoreError::NotFound);
        }

        tx.execute(
            "INSERT INTO comments (text, tweet_id, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![text, tweet_id, user_id, created_at],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;

        Ok(Comment {
            id,
            text: text.to_string(),
            tweet_id,
            user_id,
            created_at,
        })
    }

    /// Comments for a tweet, oldest first. Absent parent is an error, not an
    /// empty list.
    pub fn list_comments(&self, tweet_id: i64) -> Result<Vec<Comment>, StoreError> {
        let conn = self.conn.lock();

        let parent_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tweets WHERE id = ?1)",
            params![tweet_id],
            |row| row.get(0),
        )?;
        if !parent_exists {
            return Err(StoreError::NotFound);
        }

        let mut stmt = conn.prepare(
            "SELECT id, text, tweet_id, user_id, created_at FROM comments
             WHERE tweet_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;

        let comments = stmt
            .query_map(params![tweet_id], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}
