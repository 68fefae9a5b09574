//! Read-only directory over the casino and bonus catalog.
//!
//! The catalog tables are owned by the content pipeline; this crate only
//! reads them to decorate claim notifications with display fields.

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use pulse_core::{ClaimDirectory, ClaimDisplay, Error, Result};

/// PostgreSQL implementation of the claim display lookup.
#[derive(Clone)]
pub struct PgContentDirectory {
    pool: Pool<Postgres>,
}

impl PgContentDirectory {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ClaimDirectory for PgContentDirectory {
    async fn claim_display(
        &self,
        casino_id: Uuid,
        bonus_id: Uuid,
    ) -> Result<Option<ClaimDisplay>> {
        let row = sqlx::query(
            "SELECT c.name AS casino_name,
                    c.slug AS casino_slug,
                    c.logo_url AS casino_logo,
                    b.title AS bonus_title,
                    b.code AS bonus_code
             FROM casino c
             JOIN bonus b ON b.casino_id = c.id
             WHERE c.id = $1 AND b.id = $2",
        )
        .bind(casino_id)
        .bind(bonus_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| ClaimDisplay {
            casino_name: r.get("casino_name"),
            casino_slug: r.get("casino_slug"),
            casino_logo: r.get("casino_logo"),
            bonus_title: r.get("bonus_title"),
            bonus_code: r.get("bonus_code"),
        }))
    }
}
