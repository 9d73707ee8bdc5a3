//! User Storage
//! Mission: Account rows, uniqueness enforcement, and explicit cascades

use rusqlite::params;
use tracing::info;

use crate::models::User;
use crate::store::{is_unique_violation, now_iso, user_from_row, Db, StoreError, USER_COLUMNS};

impl Db {
    /// Insert a new user. A UNIQUE violation on the email column - including
    /// one raised by a concurrent insert that won the race - comes back as
    /// `Duplicate`, never as a crash.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let created_at = now_iso();
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO users (name, email, password_hash, is_active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![name, email, password_hash, created_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate("email")
            } else {
                StoreError::Sqlite(e)
            }
        })?;

        let id = conn.last_insert_rowid();
        info!("✅ Created user {} ({})", email, id);

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at,
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial profile update. Fields left as `None` are untouched.
    /// An email change re-checks uniqueness through the same UNIQUE
    /// constraint as registration.
    pub fn update_user(
        &self,
        id: i64,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if let Some(name) = name {
            tx.execute("UPDATE users SET name = ?1 WHERE id = ?2", params![name, id])?;
        }
        if let Some(email) = email {
            tx.execute(
                "UPDATE users SET email = ?1 WHERE id = ?2",
                params![email, id],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate("email")
                } else {
                    StoreError::Sqlite(e)
                }
            })?;
        }
        if let Some(hash) = password_hash {
            tx.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![hash, id],
            )?;
        }

        let updated = tx.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        );

        let user = match updated {
            Ok(user) => user,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Err(StoreError::NotFound),
            Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(user)
    }

    pub fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let changes = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;

        if changes == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Remove an account and everything it owns in one transaction:
    /// comments on the user's tweets, the user's own comments, the user's
    /// tweets, both directions of the follow graph, then the user row.
    pub fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM comments
             WHERE tweet_id IN (SELECT id FROM tweets WHERE owner_id = ?1)",
            params![id],
        )?;
        tx.execute("DELETE FROM comments WHERE user_id = ?1", params![id])?;
        tx.execute("DELETE FROM tweets WHERE owner_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM follows WHERE follower_id = ?1 OR following_id = ?1",
            params![id],
        )?;
        let changes = tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;

        if changes == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit()?;
        info!("🗑️  Deleted user {} and owned records", id);
        Ok(())
    }
}
