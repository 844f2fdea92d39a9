use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use spotcast_common::{PipelineRun, RunStatus, StepRecord};

use crate::error::Result;

/// Transitions any `running` run older than `threshold` to `failed_stale`
/// (spec §4.10 "Stale-run recovery", invariant 11). Returns the number of
/// rows transitioned.
pub async fn recover_stale_runs(pool: &PgPool, threshold: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE pipeline_runs
        SET status = 'failed_stale', finished_at = now()
        WHERE status = 'running' AND started_at < $1
        "#,
    )
    .bind(threshold)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn start(pool: &PgPool, run_date: &str, area_filter: Option<&str>) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO pipeline_runs (started_at, status, run_date, steps, area_filter)
        VALUES (now(), 'running', $1, '{}', $2)
        RETURNING id
        "#,
    )
    .bind(run_date)
    .bind(area_filter)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn record_step(
    pool: &PgPool,
    run_id: i64,
    step_name: &str,
    record: &StepRecord,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE pipeline_runs
        SET steps = jsonb_set(steps, ARRAY[$2], $3::jsonb, true)
        WHERE id = $1
        "#,
    )
    .bind(run_id)
    .bind(step_name)
    .bind(serde_json::to_value(record)?)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn finish(pool: &PgPool, run_id: i64, status: RunStatus) -> Result<()> {
    sqlx::query("UPDATE pipeline_runs SET status = $2, finished_at = now() WHERE id = $1")
        .bind(run_id)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<PipelineRun>> {
    let row = sqlx::query_as::<_, PipelineRun>("SELECT * FROM pipeline_runs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn latest(pool: &PgPool) -> Result<Option<PipelineRun>> {
    let row = sqlx::query_as::<_, PipelineRun>(
        "SELECT * FROM pipeline_runs ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn any_running(pool: &PgPool) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pipeline_runs WHERE status = 'running'")
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub fn empty_steps() -> BTreeMap<String, StepRecord> {
    BTreeMap::new()
}
