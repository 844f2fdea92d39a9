//! Applies inbound admin callbacks to the store under audit (spec §4.11).
//! Every mutation and its audit row commit in one transaction (spec §5
//! "Audit entries for a mutation commit in the same transaction as the
//! mutation").

pub mod callback;
pub mod error;

pub use callback::{parse, Callback};
pub use error::{CurationError, Result};

use serde_json::json;
use sqlx::PgPool;
use spotcast_common::{AuditAction, SpotSource, SpotStatus};
use tracing::info;

/// Parses `payload` and applies it, recording `actor` on the audit row.
pub async fn apply(pool: &PgPool, payload: &str, actor: &str) -> Result<()> {
    let callback = callback::parse(payload)?;
    apply_callback(pool, &callback, actor).await
}

pub async fn apply_callback(pool: &PgPool, callback: &Callback, actor: &str) -> Result<()> {
    let mut tx = pool.begin().await.map_err(spotcast_store::StoreError::from)?;

    match callback {
        Callback::Approve(id) => {
            set_status(&mut tx, *id, SpotStatus::Approved, actor).await?;
        }
        Callback::Deny(id) => {
            set_status(&mut tx, *id, SpotStatus::Denied, actor).await?;
        }
        Callback::EditApprove(id) => {
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
            .execute(&mut *tx)
            .await
            .map_err(spotcast_store::StoreError::from)?;
            spotcast_store::audit::record(&mut tx, "spots", &id.to_string(), AuditAction::Update, actor, &json!({"pendingEdit": "applied"}))
                .await?;
        }
        Callback::EditDeny(id) => {
            sqlx::query("UPDATE spots SET pending_edit = NULL, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(spotcast_store::StoreError::from)?;
            spotcast_store::audit::record(&mut tx, "spots", &id.to_string(), AuditAction::Update, actor, &json!({"pendingEdit": "rejected"}))
                .await?;
        }
        Callback::DeleteApprove(id) => {
            let row: Option<(Option<String>, SpotSource)> =
                sqlx::query_as("SELECT venue_id, source FROM spots WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(spotcast_store::StoreError::from)?;
            let (venue_id, source) = row.ok_or(CurationError::SpotNotFound(*id))?;

            if source == SpotSource::Automated {
                if let Some(venue_id) = venue_id {
                    exclude_venue(&mut tx, pool, &venue_id, "automated spot delete approved", actor).await?;
                }
            }

            sqlx::query("DELETE FROM spots WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(spotcast_store::StoreError::from)?;
            spotcast_store::audit::record(&mut tx, "spots", &id.to_string(), AuditAction::Delete, actor, &json!({"reason": "delete approved"}))
                .await?;
        }
        Callback::DeleteDeny(id) => {
            sqlx::query("UPDATE spots SET pending_delete = false, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(spotcast_store::StoreError::from)?;
            spotcast_store::audit::record(&mut tx, "spots", &id.to_string(), AuditAction::Update, actor, &json!({"pendingDelete": "rejected"}))
                .await?;
        }
        Callback::ReportExclude(id) => {
            let venue_id: Option<String> = sqlx::query_scalar("SELECT venue_id FROM spots WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(spotcast_store::StoreError::from)?
                .flatten();
            if let Some(venue_id) = venue_id {
                exclude_venue(&mut tx, pool, &venue_id, "reported", actor).await?;
            }
            sqlx::query("DELETE FROM spots WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(spotcast_store::StoreError::from)?;
            spotcast_store::audit::record(&mut tx, "spots", &id.to_string(), AuditAction::Delete, actor, &json!({"reason": "report excluded"}))
                .await?;
        }
        Callback::ReportKeep(id) => {
            spotcast_store::audit::record(&mut tx, "spots", &id.to_string(), AuditAction::Update, actor, &json!({"report": "dismissed"}))
                .await?;
        }
        Callback::ActivityAdd(name) => {
            sqlx::query("INSERT INTO activities (name, active) VALUES ($1, true) ON CONFLICT (name) DO UPDATE SET active = true")
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(spotcast_store::StoreError::from)?;
            spotcast_store::audit::record(&mut tx, "activities", name, AuditAction::Insert, actor, &json!({"active": true}))
                .await?;
        }
        Callback::ActivityDeny(name) => {
            sqlx::query("UPDATE activities SET active = false WHERE name = $1")
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(spotcast_store::StoreError::from)?;
            spotcast_store::audit::record(&mut tx, "activities", name, AuditAction::Update, actor, &json!({"active": false}))
                .await?;
        }
    }

    tx.commit().await.map_err(spotcast_store::StoreError::from)?;
    info!(callback = ?callback, actor, "curation: callback applied");
    Ok(())
}

async fn set_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
    status: SpotStatus,
    actor: &str,
) -> Result<()> {
    sqlx::query("UPDATE spots SET status = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await
        .map_err(spotcast_store::StoreError::from)?;
    spotcast_store::audit::record(tx, "spots", &id.to_string(), AuditAction::Update, actor, &json!({"status": status}))
        .await?;
    Ok(())
}

async fn exclude_venue(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    pool: &PgPool,
    venue_id: &str,
    reason: &str,
    actor: &str,
) -> Result<()> {
    let venue = spotcast_store::venues::find_by_id(pool, venue_id).await?;
    let (name, area) = venue.map(|v| (v.name, v.area)).unwrap_or_else(|| (venue_id.to_string(), None));
    sqlx::query(
        r#"
        INSERT INTO watchlist (venue_id, name, area, status, reason, updated_at)
        VALUES ($1, $2, $3, 'excluded', $4, now())
        ON CONFLICT (venue_id) DO UPDATE SET
            name = EXCLUDED.name, area = EXCLUDED.area, status = 'excluded', reason = EXCLUDED.reason, updated_at = now()
        "#,
    )
    .bind(venue_id)
    .bind(&name)
    .bind(&area)
    .bind(reason)
    .execute(&mut **tx)
    .await
    .map_err(spotcast_store::StoreError::from)?;
    spotcast_store::audit::record(tx, "watchlist", venue_id, AuditAction::Update, actor, &json!({"status": "excluded", "reason": reason}))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_dispatches_approve() {
        let cb = callback::parse("approve_99").unwrap();
        assert_eq!(cb, Callback::Approve(99));
    }
}
