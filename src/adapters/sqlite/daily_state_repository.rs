//! SQLite adapter for DailyStateRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::{decode_record, encode_record, DailyState};
use crate::domain::ports::DailyStateRepository;

/// Stores one daily state per subscriber.
#[derive(Clone)]
pub struct SqliteDailyStateRepository {
    pool: SqlitePool,
    subscriber_id: String,
    capacity: usize,
}

impl SqliteDailyStateRepository {
    /// `capacity` is only used to upgrade legacy payloads on load.
    pub fn new(pool: SqlitePool, subscriber_id: impl Into<String>, capacity: usize) -> Self {
        Self {
            pool,
            subscriber_id: subscriber_id.into(),
            capacity,
        }
    }

    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }
}

#[derive(sqlx::FromRow)]
struct DailyStateRow {
    payload: String,
}

fn row_to_state(row: DailyStateRow, capacity: usize) -> DomainResult<DailyState> {
    decode_record(&row.payload, capacity)
}

#[async_trait]
impl DailyStateRepository for SqliteDailyStateRepository {
    async fn load(&self) -> DomainResult<Option<DailyState>> {
        let row: Option<DailyStateRow> =
            sqlx::query_as("SELECT payload FROM daily_state WHERE subscriber_id = ?")
                .bind(&self.subscriber_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| row_to_state(r, self.capacity)).transpose()
    }

    async fn save(&self, state: &DailyState) -> DomainResult<()> {
        let payload = encode_record(state)?;

        sqlx::query(
            r#"INSERT INTO daily_state (subscriber_id, logical_date, payload, last_nudge_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(subscriber_id) DO UPDATE SET
                   logical_date = excluded.logical_date,
                   payload = excluded.payload,
                   last_nudge_at = excluded.last_nudge_at,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&self.subscriber_id)
        .bind(state.logical_date.to_string())
        .bind(&payload)
        .bind(state.last_nudge_at)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
