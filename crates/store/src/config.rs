use serde_json::Value;
use sqlx::PgPool;

use crate::error::Result;

/// Durable config blobs keyed by name (e.g. `areas`). Mirrors the on-disk
/// `config/` directory so operators can inspect the same values either way.
pub async fn set(pool: &PgPool, name: &str, value: &Value) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO config (name, value, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
        "#,
    )
    .bind(name)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &PgPool, name: &str) -> Result<Option<Value>> {
    let value: Option<Value> = sqlx::query_scalar("SELECT value FROM config WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}
