//! Tweet Storage
//! Mission: CRUD with the ownership predicate inside the mutating statement

use rusqlite::{params, Transaction};

use crate::models::Tweet;
use crate::store::{now_iso, Db, StoreError};

fn tweet_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tweet> {
    Ok(Tweet {
        id: row.get(0)?,
        content: row.get(1)?,
        owner_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

const TWEET_COLUMNS: &str = "id, content, owner_id, created_at";

/// Distinguish "tweet absent" from "tweet owned by someone else" after a
/// conditional mutation touched zero rows. Runs inside the same
/// transaction as the mutation, so the answer can't go stale.
fn probe_ownership(tx: &Transaction<'_>, tweet_id: i64) -> StoreError {
    match tx.query_row(
        "SELECT owner_id FROM tweets WHERE id = ?1",
        params![tweet_id],
        |row| row.get::<_, i64>(0),
    ) {
        Ok(_) => StoreError::NotOwner,
        Err(rusqlite::Error::QueryReturnedNoRows) => StoreError::NotFound,
        Err(e) => StoreError::Sqlite(e),
    }
}

impl Db {
    pub fn create_tweet(&self, owner_id: i64, content: &str) -> Result<Tweet, StoreError> {
        let created_at = now_iso();
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO tweets (content, owner_id, created_at) VALUES (?1, ?2, ?3)",
            params![content, owner_id, created_at],
        )?;

        Ok(Tweet {
            id: conn.last_insert_rowid(),
            content: content.to_string(),
            owner_id,
            created_at,
        })
    }

    pub fn get_tweet(&self, id: i64) -> Result<Option<Tweet>, StoreError> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            &format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE id = ?1"),
            params![id],
            tweet_from_row,
        );

        match result {
            Ok(tweet) => Ok(Some(tweet)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest first; `id` breaks ties between same-instant timestamps.
    pub fn list_tweets(&self, skip: i64, limit: i64) -> Result<Vec<Tweet>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets
             ORDER BY created_at DESC, id DESC
             LIMIT ?1 OFFSET ?2"
        ))?;

        let tweets = stmt
            .query_map(params![limit, skip], tweet_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tweets)
    }

    /// Tweets authored by users the reader follows, newest first.
    pub fn list_feed(&self, user_id: i64, skip: i64, limit: i64) -> Result<Vec<Tweet>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.content, t.owner_id, t.created_at FROM tweets t
             JOIN follows f ON f.following_id = t.owner_id
             WHERE f.follower_id = ?1
             ORDER BY t.created_at DESC, t.id DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let tweets = stmt
            .query_map(params![user_id, limit, skip], tweet_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tweets)
    }

    /// Replace a tweet's content. The owner predicate is part of the UPDATE
    /// itself; a concurrent edit by a different actor can never slip between
    /// an ownership check and the write.
    pub fn update_tweet(
        &self,
        id: i64,
        owner_id: i64,
        content: &str,
    ) -> Result<Tweet, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let changes = tx.execute(
            "UPDATE tweets SET content = ?1 WHERE id = ?2 AND owner_id = ?3",
            params![content, id, owner_id],
        )?;

        if changes == 0 {
            return Err(probe_ownership(&tx, id));
        }

        let tweet = tx.query_row(
            &format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE id = ?1"),
            params![id],
            tweet_from_row,
        )?;

        tx.commit()?;
        Ok(tweet)
    }

    /// Delete a tweet and its comments in one transaction, with the same
    /// conditional-ownership predicate as `update_tweet`.
    pub fn delete_tweet(&self, id: i64, owner_id: i64) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM comments
             WHERE tweet_id IN (SELECT id FROM tweets WHERE id = ?1 AND owner_id = ?2)",
            params![id, owner_id],
        )?;
        let changes = tx.execute(
            "DELETE FROM tweets WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;

        if changes == 0 {
            return Err(probe_ownership(&tx, id));
        }

        tx.commit()?;
        Ok(())
    }
}
