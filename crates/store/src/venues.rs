use sqlx::PgPool;
use spotcast_common::Venue;

use crate::error::Result;

/// Upsert a venue keyed by `id` (spec §4.2: the Seeder never shrinks
/// `venues`; re-running is idempotent by id).
pub async fn upsert(pool: &PgPool, venue: &Venue) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO venues
            (id, name, lat, lng, area, address, website, zip_codes, address_components, operating_hours, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            lat = EXCLUDED.lat,
            lng = EXCLUDED.lng,
            area = EXCLUDED.area,
            address = EXCLUDED.address,
            website = EXCLUDED.website,
            zip_codes = EXCLUDED.zip_codes,
            address_components = EXCLUDED.address_components,
            operating_hours = EXCLUDED.operating_hours,
            updated_at = now()
        "#,
    )
    .bind(&venue.id)
    .bind(&venue.name)
    .bind(venue.lat)
    .bind(venue.lng)
    .bind(&venue.area)
    .bind(&venue.address)
    .bind(&venue.website)
    .bind(serde_json::to_value(&venue.zip_codes)?)
    .bind(&venue.address_components)
    .bind(&venue.operating_hours)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Venue>> {
    let row = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Venue>> {
    let rows = sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_by_area(pool: &PgPool, area: &str) -> Result<Vec<Venue>> {
    let rows = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE area = $1 ORDER BY id")
        .bind(area)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn count_by_area(pool: &PgPool) -> Result<Vec<(Option<String>, i64)>> {
    let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
        "SELECT area, COUNT(*) FROM venues GROUP BY area ORDER BY area",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
