use chrono::NaiveDate;
use sqlx::PgPool;
use spotcast_common::Streak;

use crate::error::Result;

pub async fn find(pool: &PgPool, venue_id: &str, kind: &str) -> Result<Option<Streak>> {
    let row = sqlx::query_as::<_, Streak>(
        "SELECT * FROM streaks WHERE venue_id = $1 AND type = $2",
    )
    .bind(venue_id)
    .bind(kind)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Increments the streak for `(venue_id, type)` on `date` if not already
/// recorded for that date, resetting to 1 if a day was skipped (spec §4.9
/// / GLOSSARY "Streak").
pub async fn record_change(
    pool: &PgPool,
    venue_id: &str,
    kind: &str,
    name: &str,
    date: NaiveDate,
) -> Result<()> {
    let existing = find(pool, venue_id, kind).await?;
    let next_streak = match existing {
        Some(s) if s.last_date == date => s.streak,
        Some(s) if s.last_date.succ_opt() == Some(date) => s.streak + 1,
        Some(_) => 1,
        None => 1,
    };

    sqlx::query(
        r#"
        INSERT INTO streaks (venue_id, type, name, last_date, streak)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (venue_id, type) DO UPDATE SET
            name = EXCLUDED.name,
            last_date = EXCLUDED.last_date,
            streak = EXCLUDED.streak
        "#,
    )
    .bind(venue_id)
    .bind(kind)
    .bind(name)
    .bind(date)
    .bind(next_streak)
    .execute(pool)
    .await?;
    Ok(())
}
