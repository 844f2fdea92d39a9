use sqlx::PgPool;

use crate::error::Result;

/// Activity categories are a small operator-curated set (spec §4.11
/// `approve-activity` / `reject-activity`).
pub async fn upsert(pool: &PgPool, name: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO activities (name, active) VALUES ($1, true) ON CONFLICT (name) DO UPDATE SET active = true",
    )
    .bind(name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn deactivate(pool: &PgPool, name: &str) -> Result<()> {
    sqlx::query("UPDATE activities SET active = false WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn is_active(pool: &PgPool, name: &str) -> Result<bool> {
    let active: Option<bool> =
        sqlx::query_scalar("SELECT active FROM activities WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(active.unwrap_or(true))
}
