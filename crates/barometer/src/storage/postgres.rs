//! PostgreSQL への書き込み。

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, postgres::PgPoolOptions};

use super::{BackendError, Database, LogItem, StorageError};
use crate::config::StorageConfig;

pub struct Postgres {
    pool: PgPool,
}

impl Postgres {
    /// 接続プールを作成し、`log_items` テーブルのマイグレーションを適用する。
    pub async fn connect(config: &StorageConfig) -> Result<Self, BackendError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(config.timeout)
            .connect(&config.url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for Postgres {
    async fn insert(&self, item: &LogItem) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO log_items (timestamp, user_id, log_measure, notes) VALUES ($1, $2, $3, $4)",
        )
        .bind(item.timestamp.with_timezone(&Utc))
        .bind(&item.user_id)
        .bind(item.log_measure)
        .bind(&item.notes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::DateTime;

    use super::*;

    /// `DATABASE_URL` で指定した PostgreSQL に実際に書き込む。
    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_insert_and_read_back() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let config = StorageConfig {
            url,
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let db = Postgres::connect(&config).await.unwrap();

        // 他のテスト実行と行が混ざらないようにユーザー ID を一意にする
        let user_id = format!("U-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let item = LogItem {
            timestamp: crate::time::resolve_timestamp("1609459200", "Asia/Manila").unwrap(),
            user_id: user_id.clone(),
            log_measure: 3,
            notes: "feeling okay".to_string(),
        };
        db.insert(&item).await.unwrap();

        let rows: Vec<(DateTime<Utc>, String, i64, String)> = sqlx::query_as(
            "SELECT timestamp, user_id, log_measure, notes FROM log_items WHERE user_id = $1",
        )
        .bind(&user_id)
        .fetch_all(&db.pool)
        .await
        .unwrap();

        assert_eq!(rows.len(), 1);
        let (timestamp, stored_user, log_measure, notes) = &rows[0];
        assert_eq!(*timestamp, item.timestamp);
        assert_eq!(stored_user, &user_id);
        assert_eq!(*log_measure, 3);
        assert_eq!(notes, "feeling okay");
    }
}
