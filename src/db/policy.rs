//! Repository for the runtime policy.

use super::DbError;
use acwarden_rules::PolicyValue;
use serde_json::Value;
use sqlx::SqlitePool;

/// Repository for policy rows.
pub struct PolicyRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PolicyRepository<'a> {
    /// Create a new policy repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load every stored `(key, value)` pair.
    pub async fn load(&self) -> Result<Vec<(String, Value)>, DbError> {
        let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM config")
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|(key, raw)| match serde_json::from_str(&raw) {
                Ok(value) => Ok((key, value)),
                Err(source) => Err(DbError::Decode { key, source }),
            })
            .collect()
    }

    /// Write the given entries in one transaction.
    pub async fn save<'k, I>(&self, entries: I) -> Result<(), DbError>
    where
        I: IntoIterator<Item = (&'k str, &'k PolicyValue)>,
    {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO config (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value.to_json().to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
