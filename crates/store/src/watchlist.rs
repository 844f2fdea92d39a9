use sqlx::PgPool;
use spotcast_common::{WatchlistEntry, WatchlistStatus};

use crate::error::Result;

pub async fn upsert(pool: &PgPool, entry: &WatchlistEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO watchlist (venue_id, name, area, status, reason, updated_at)
        VALUES ($1, $2, $3, $4, $5, now())
        ON CONFLICT (venue_id) DO UPDATE SET
            name = EXCLUDED.name,
            area = EXCLUDED.area,
            status = EXCLUDED.status,
            reason = EXCLUDED.reason,
            updated_at = now()
        "#,
    )
    .bind(&entry.venue_id)
    .bind(&entry.name)
    .bind(&entry.area)
    .bind(status_str(entry.status))
    .bind(&entry.reason)
    .execute(pool)
    .await?;
    Ok(())
}

/// Whether a venue is currently excluded from spot materialization
/// (spec §4.9 "skip if watchlist.excluded").
pub async fn is_excluded(pool: &PgPool, venue_id: &str) -> Result<bool> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM watchlist WHERE venue_id = $1")
            .bind(venue_id)
            .fetch_optional(pool)
            .await?;
    Ok(status.as_deref() == Some("excluded"))
}

pub async fn list_by_status(pool: &PgPool, status: WatchlistStatus) -> Result<Vec<WatchlistEntry>> {
    let rows = sqlx::query_as::<_, WatchlistEntry>("SELECT * FROM watchlist WHERE status = $1")
        .bind(status_str(status))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

fn status_str(status: WatchlistStatus) -> &'static str {
    match status {
        WatchlistStatus::Excluded => "excluded",
        WatchlistStatus::Flagged => "flagged",
    }
}
