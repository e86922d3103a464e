//! Repository for ban records.

use super::{DbError, from_millis};
use crate::store::BanRecord;
use sqlx::SqlitePool;

type BanRow = (String, String, String, String, String, i64, i64, Option<String>);

/// Repository for ban operations.
pub struct BanRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BanRepository<'a> {
    /// Create a new ban repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a ban, replacing any earlier ban for the same player.
    pub async fn upsert(&self, record: &BanRecord) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO banned_accounts
                (player_id, player_name, hardware_id, ip_address, reason,
                 ban_duration_hours, banned_at, expires_at, banned_by)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.player_id)
        .bind(&record.player_name)
        .bind(&record.hardware_id)
        .bind(&record.ip_address)
        .bind(&record.reason)
        .bind(record.ban_duration_hours)
        .bind(record.banned_at.timestamp_millis())
        .bind(record.expires_at().map(|t| t.timestamp_millis()))
        .bind(record.banned_by.as_deref())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a player's ban.
    pub async fn remove(&self, player_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM banned_accounts WHERE player_id = ?")
            .bind(player_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All bans, newest first.
    pub async fn list(&self) -> Result<Vec<BanRecord>, DbError> {
        let rows = sqlx::query_as::<_, BanRow>(
            r#"
            SELECT player_id, player_name, hardware_id, ip_address, reason,
                   ban_duration_hours, banned_at, banned_by
            FROM banned_accounts
            ORDER BY banned_at DESC, rowid DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(
                |(player_id, player_name, hardware_id, ip_address, reason, hours, at, by)| {
                    Ok(BanRecord {
                        player_id,
                        player_name,
                        hardware_id,
                        ip_address,
                        reason,
                        ban_duration_hours: hours,
                        banned_at: from_millis(at)?,
                        banned_by: by,
                    })
                },
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::store::BanRecord;
    use chrono::{Duration, TimeZone, Utc};

    fn ban(player_id: &str, reason: &str, hours_ago: i64) -> BanRecord {
        BanRecord {
            player_id: player_id.into(),
            player_name: "Unknown".into(),
            hardware_id: "HW".into(),
            ip_address: "Unknown".into(),
            reason: reason.into(),
            ban_duration_hours: 336,
            banned_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
                - Duration::hours(hours_ago),
            banned_by: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_player() {
        let db = Database::new(":memory:").await.unwrap();
        db.bans().upsert(&ban("P1", "first", 2)).await.unwrap();
        db.bans().upsert(&ban("P1", "second", 1)).await.unwrap();

        let bans = db.bans().list().await.unwrap();
        assert_eq!(bans.len(), 1);
        assert_eq!(bans[0].reason, "second");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(":memory:").await.unwrap();
        db.bans().upsert(&ban("OLD", "r", 5)).await.unwrap();
        db.bans().upsert(&ban("NEW", "r", 0)).await.unwrap();
        db.bans().upsert(&ban("MID", "r", 2)).await.unwrap();

        let ids: Vec<_> = db
            .bans()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.player_id)
            .collect();
        assert_eq!(ids, vec!["NEW", "MID", "OLD"]);
    }

    #[tokio::test]
    async fn test_remove() {
        let db = Database::new(":memory:").await.unwrap();
        let mut kick = ban("P1", "Kicked from console", 0);
        kick.ban_duration_hours = 0;
        kick.banned_by = Some("Console (Kick)".into());
        db.bans().upsert(&kick).await.unwrap();

        let stored = db.bans().list().await.unwrap();
        assert_eq!(stored, vec![kick]);

        assert!(db.bans().remove("P1").await.unwrap());
        assert!(!db.bans().remove("P1").await.unwrap());
        assert!(db.bans().list().await.unwrap().is_empty());
    }
}
