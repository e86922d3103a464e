//! Repository for the allow list.

use super::{DbError, from_millis};
use crate::store::AllowRecord;
use sqlx::SqlitePool;

/// Repository for allow-list operations.
pub struct AllowRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AllowRepository<'a> {
    /// Create a new allow-list repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add an entry. Returns `false` if the player was already listed; the
    /// existing entry is kept.
    pub async fn add(&self, record: &AllowRecord) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO allowed_accounts (player_id, player_name, added_at, added_by)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&record.player_id)
        .bind(&record.player_name)
        .bind(record.added_at.timestamp_millis())
        .bind(&record.added_by)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove an entry.
    pub async fn remove(&self, player_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM allowed_accounts WHERE player_id = ?")
            .bind(player_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check whether a player is listed.
    pub async fn contains(&self, player_id: &str) -> Result<bool, DbError> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM allowed_accounts WHERE player_id = ?")
                .bind(player_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<AllowRecord>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, i64, String)>(
            r#"
            SELECT player_id, player_name, added_at, added_by
            FROM allowed_accounts
            ORDER BY added_at DESC, rowid DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(player_id, player_name, added_at, added_by)| {
                Ok(AllowRecord {
                    player_id,
                    player_name,
                    added_at: from_millis(added_at)?,
                    added_by,
                })
            })
            .collect()
    }
}
