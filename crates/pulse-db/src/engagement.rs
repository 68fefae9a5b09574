//! Engagement event store backed by PostgreSQL.
//!
//! Events land in the append-only `engagement_event` table. Rows are never
//! updated or deleted by the application; aggregation happens at query time.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pulse_core::{
    new_v7, rolling_week_start, utc_day_bounds, ActionKind, EngagementEvent, EngagementStats,
    EngagementStore, Error, NewEngagementEvent, RecentSearch, Result,
};

/// PostgreSQL implementation of the engagement event store.
#[derive(Clone)]
pub struct PgEngagementStore {
    pool: Pool<Postgres>,
}

impl PgEngagementStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fetch a single event by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EngagementEvent>> {
        let row = sqlx::query(
            "SELECT id, action, casino_id, bonus_id, path, correlation_key, created_at
             FROM engagement_event
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| Self::parse_row(&r)))
    }

    fn parse_row(row: &PgRow) -> EngagementEvent {
        let action: String = row.get("action");
        EngagementEvent {
            id: row.get("id"),
            action: parse_action(&action),
            casino_id: row.get("casino_id"),
            bonus_id: row.get("bonus_id"),
            path: row.get("path"),
            correlation_key: row.get("correlation_key"),
            created_at: row.get("created_at"),
        }
    }
}

// Helper to parse an action column. The CHECK constraint keeps the stored
// vocabulary closed, so the fallback is unreachable in practice; if the
// column ever drifts, the row lands in the `test` bucket with a loud log
// instead of silently passing as real engagement.
fn parse_action(s: &str) -> ActionKind {
    s.parse().unwrap_or_else(|_| {
        tracing::warn!(
            subsystem = "database",
            action = %s,
            "Unrecognized action value in storage, counting as test"
        );
        ActionKind::Test
    })
}

fn classify_insert_error(e: sqlx::Error) -> Error {
    let err = Error::Database(e);
    if err.is_foreign_key_violation() {
        Error::InvalidInput("unknown casino or bonus reference".to_string())
    } else {
        err
    }
}

#[async_trait::async_trait]
impl EngagementStore for PgEngagementStore {
    async fn insert(&self, event: &NewEngagementEvent) -> Result<EngagementEvent> {
        let id = new_v7();
        let row = sqlx::query(
            "INSERT INTO engagement_event (id, action, casino_id, bonus_id, path, correlation_key)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING created_at",
        )
        .bind(id)
        .bind(event.action.as_str())
        .bind(event.detail.casino_id())
        .bind(event.detail.bonus_id())
        .bind(event.detail.path())
        .bind(event.detail.correlation_key())
        .fetch_one(&self.pool)
        .await
        .map_err(classify_insert_error)?;

        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(EngagementEvent {
            id,
            action: event.action,
            casino_id: event.detail.casino_id(),
            bonus_id: event.detail.bonus_id(),
            path: event.detail.path().map(str::to_string),
            correlation_key: event.detail.correlation_key().map(str::to_string),
            created_at,
        })
    }

    async fn visit_exists_between(
        &self,
        path: &str,
        fingerprint: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS (
                 SELECT 1 FROM engagement_event
                 WHERE action = 'page_visit'
                   AND path = $1
                   AND correlation_key = $2
                   AND created_at >= $3
                   AND created_at < $4
             ) AS present",
        )
        .bind(path)
        .bind(fingerprint)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("present"))
    }

    async fn stats(&self, as_of: DateTime<Utc>) -> Result<EngagementStats> {
        let (day_start, _) = utc_day_bounds(as_of);
        let week_start = rolling_week_start(as_of);

        let rows = sqlx::query(
            "SELECT action,
                    COUNT(*) FILTER (WHERE created_at >= $1) AS today,
                    COUNT(*) FILTER (WHERE created_at >= $2) AS week,
                    COUNT(*) AS total
             FROM engagement_event
             GROUP BY action",
        )
        .bind(day_start)
        .bind(week_start)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut stats = EngagementStats::empty(as_of);
        for row in rows {
            let action: String = row.get("action");
            let counts = stats.counts_mut(parse_action(&action));
            counts.today = row.get("today");
            counts.week = row.get("week");
            counts.total = row.get("total");
        }
        Ok(stats)
    }

    async fn recent_searches(&self, limit: i64) -> Result<Vec<RecentSearch>> {
        let rows = sqlx::query(
            "SELECT correlation_key, created_at
             FROM engagement_event
             WHERE action = 'search' AND correlation_key IS NOT NULL
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|r| RecentSearch {
                term: r.get("correlation_key"),
                at: r.get("created_at"),
            })
            .collect())
    }
}
