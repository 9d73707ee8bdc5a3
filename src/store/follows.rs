//! Follow Graph Storage
//! Mission: Directional follower edges, idempotent in both directions

use rusqlite::params;

use crate::models::User;
use crate::store::{now_iso, user_from_row, Db, StoreError};

impl Db {
    /// Record that `follower_id` follows `following_id`. Re-following is a
    /// no-op. The target must exist.
    pub fn follow(&self, follower_id: i64, following_id: i64) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let target_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![following_id],
            |row| row.get(0),
        )?;
        if !target_exists {
            return Err(StoreError::NotFound);
        }

        tx.execute(
            "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![follower_id, following_id, now_iso()],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Remove a follow edge. Unfollowing someone never followed is a no-op.
    pub fn unfollow(&self, follower_id: i64, following_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
            params![follower_id, following_id],
        )?;
        Ok(())
    }

    /// Users following `user_id`.
    pub fn list_followers(&self, user_id: i64) -> Result<Vec<User>, StoreError> {
        self.list_edge_users(
            user_id,
            "SELECT u.id, u.name, u.email, u.password_hash, u.is_active, u.created_at
             FROM users u
             JOIN follows f ON f.follower_id = u.id
             WHERE f.following_id = ?1
             ORDER BY f.created_at ASC",
        )
    }

    /// Users that `user_id` follows.
    pub fn list_following(&self, user_id: i64) -> Result<Vec<User>, StoreError> {
        self.list_edge_users(
            user_id,
            "SELECT u.id, u.name, u.email, u.password_hash, u.is_active, u.created_at
             FROM users u
             JOIN follows f ON f.following_id = u.id
             WHERE f.follower_id = ?1
             ORDER BY f.created_at ASC",
        )
    }

    fn list_edge_users(&self, user_id: i64, sql: &str) -> Result<Vec<User>, StoreError> {
        let conn = self.conn.lock();

        let user_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![user_id],
            |row| row.get(0),
        )?;
        if !user_exists {
            return Err(StoreError::NotFound);
        }

        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map(params![user_id], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }
}
