use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use spotcast_common::AuditAction;

use crate::error::Result;

/// Append an audit row in the same transaction as the mutation it
/// describes (spec §5 "Audit entries for a mutation commit in the same
/// transaction as the mutation"; invariant 12).
pub async fn record(
    tx: &mut Transaction<'_, Postgres>,
    table_name: &str,
    row_key: &str,
    action: AuditAction,
    actor: &str,
    diff: &Value,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO audit (table_name, row_key, action, actor, diff)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(table_name)
    .bind(row_key)
    .bind(action)
    .bind(actor)
    .bind(diff)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn for_row(pool: &PgPool, table_name: &str, row_key: &str) -> Result<Vec<spotcast_common::AuditLogEntry>> {
    let rows = sqlx::query_as::<_, spotcast_common::AuditLogEntry>(
        "SELECT * FROM audit WHERE table_name = $1 AND row_key = $2 ORDER BY at DESC",
    )
    .bind(table_name)
    .bind(row_key)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
