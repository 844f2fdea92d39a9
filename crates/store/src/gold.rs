use sqlx::{PgPool, Row};
use spotcast_common::{ExtractionMethod, GoldRecord, Promotions};

use crate::error::Result;

/// Gold isn't `sqlx::FromRow` directly because `Promotions` has a canonical
/// but non-trivial wire shape (spec §9 sum-type design note); round-trip it
/// through JSON instead of a derived decode.
pub async fn upsert(pool: &PgPool, record: &GoldRecord) -> Result<()> {
    let promotions_json = serde_json::to_value(&record.promotions)?;
    sqlx::query(
        r#"
        INSERT INTO gold
            (venue_id, venue_name, extracted_at, extraction_method, source_hash, source_modified_at, needs_llm, confidence, promotions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (venue_id) DO UPDATE SET
            venue_name = EXCLUDED.venue_name,
            extracted_at = EXCLUDED.extracted_at,
            extraction_method = EXCLUDED.extraction_method,
            source_hash = EXCLUDED.source_hash,
            source_modified_at = EXCLUDED.source_modified_at,
            needs_llm = EXCLUDED.needs_llm,
            confidence = EXCLUDED.confidence,
            promotions = EXCLUDED.promotions
        "#,
    )
    .bind(&record.venue_id)
    .bind(&record.venue_name)
    .bind(record.extracted_at)
    .bind(record.extraction_method)
    .bind(&record.source_hash)
    .bind(record.source_modified_at)
    .bind(record.needs_llm)
    .bind(record.confidence)
    .bind(promotions_json)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_venue(pool: &PgPool, venue_id: &str) -> Result<Option<GoldRecord>> {
    let row = sqlx::query("SELECT * FROM gold WHERE venue_id = $1")
        .bind(venue_id)
        .fetch_optional(pool)
        .await?;
    row.map(from_row).transpose()
}

/// Current `sourceHash` for a venue, used by the extractor's source-hash
/// gate (spec §4.7) without paying for a full row decode.
pub async fn source_hash(pool: &PgPool, venue_id: &str) -> Result<Option<String>> {
    let hash: Option<String> =
        sqlx::query_scalar("SELECT source_hash FROM gold WHERE venue_id = $1")
            .bind(venue_id)
            .fetch_optional(pool)
            .await?;
    Ok(hash)
}

pub async fn list_found(pool: &PgPool) -> Result<Vec<GoldRecord>> {
    let rows = sqlx::query("SELECT * FROM gold WHERE promotions->>'found' = 'true'")
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(from_row).collect()
}

fn from_row(row: sqlx::postgres::PgRow) -> Result<GoldRecord> {
    let promotions_json: serde_json::Value = row.try_get("promotions")?;
    let promotions: Promotions = serde_json::from_value(promotions_json)?;
    Ok(GoldRecord {
        venue_id: row.try_get("venue_id")?,
        venue_name: row.try_get("venue_name")?,
        extracted_at: row.try_get("extracted_at")?,
        extraction_method: row.try_get::<ExtractionMethod, _>("extraction_method")?,
        source_hash: row.try_get("source_hash")?,
        source_modified_at: row.try_get("source_modified_at")?,
        needs_llm: row.try_get("needs_llm")?,
        confidence: row.try_get("confidence")?,
        promotions,
    })
}
