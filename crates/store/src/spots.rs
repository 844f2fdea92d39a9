use sqlx::PgPool;
use spotcast_common::{Spot, SpotSource, SpotStatus};

use crate::error::Result;

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Spot>> {
    let row = sqlx::query_as::<_, Spot>("SELECT * FROM spots WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_natural_key(
    pool: &PgPool,
    venue_id: &str,
    kind: &str,
) -> Result<Option<Spot>> {
    let row = sqlx::query_as::<_, Spot>(
        "SELECT * FROM spots WHERE venue_id = $1 AND type = $2",
    )
    .bind(venue_id)
    .bind(kind)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_approved(pool: &PgPool) -> Result<Vec<Spot>> {
    let rows = sqlx::query_as::<_, Spot>(
        "SELECT * FROM spots WHERE status = $1 ORDER BY id",
    )
    .bind(SpotStatus::Approved)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_pending(pool: &PgPool) -> Result<Vec<Spot>> {
    let rows = sqlx::query_as::<_, Spot>(
        "SELECT * FROM spots WHERE status = $1 ORDER BY id",
    )
    .bind(SpotStatus::Pending)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fields the automated materializer is allowed to write.
pub struct UpsertSpot<'a> {
    pub venue_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub kind: &'a str,
    pub lat: f64,
    pub lng: f64,
    pub area: Option<&'a str>,
    pub source: SpotSource,
    pub status: SpotStatus,
    pub source_url: Option<&'a str>,
    pub confidence: f32,
}

/// Insert a new spot. Used when no row for `(venue_id, type)` exists yet —
/// updates for existing rows go through [`update_automated_fields`] so the
/// manual-override / pending-edit rules (spec §4.9) apply.
pub async fn insert(pool: &PgPool, s: &UpsertSpot<'_>) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO spots
            (venue_id, title, description, type, lat, lng, area, source, status, source_url, confidence)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(s.venue_id)
    .bind(s.title)
    .bind(s.description)
    .bind(s.kind)
    .bind(s.lat)
    .bind(s.lng)
    .bind(s.area)
    .bind(s.source)
    .bind(s.status)
    .bind(s.source_url)
    .bind(s.confidence)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Refresh title/description/type/status/confidence on an existing
/// automated spot. Callers must already have checked `manual_override` and
/// `pending_edit` (spec §4.9); this always writes.
pub async fn update_automated_fields(
    pool: &PgPool,
    id: i64,
    title: &str,
    description: &str,
    kind: &str,
    status: SpotStatus,
    confidence: f32,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE spots
        SET title = $2, description = $3, type = $4, status = $5, confidence = $6, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(kind)
    .bind(status)
    .bind(confidence)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_status(pool: &PgPool, id: i64, status: SpotStatus) -> Result<()> {
    sqlx::query("UPDATE spots SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_manual_override(pool: &PgPool, id: i64) -> Result<()> {
    sqlx::query(
        "UPDATE spots SET manual_override = true, edited_at = now(), updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_pending_edit(pool: &PgPool, id: i64, edit: Option<&serde_json::Value>) -> Result<()> {
    sqlx::query("UPDATE spots SET pending_edit = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(edit)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn apply_pending_edit(pool: &PgPool, id: i64) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE spots
        SET title = COALESCE(pending_edit->>'title', title),
            description = COALESCE(pending_edit->>'description', description),
            type = COALESCE(pending_edit->>'type', type),
            manual_override = true,
            pending_edit = NULL,
            edited_at = now(),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn clear_pending_edit(pool: &PgPool, id: i64) -> Result<()> {
    set_pending_edit(pool, id, None).await
}

pub async fn set_pending_delete(pool: &PgPool, id: i64, pending: bool) -> Result<()> {
    sqlx::query("UPDATE spots SET pending_delete = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(pending)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM spots WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
