use sqlx::PgPool;
use spotcast_common::{ConfidenceReview, LlmDecision};

use crate::error::Result;

/// The reviews table key (venue_id, type, period) survives across runs so
/// a decision once applied is never re-asked (spec §4.8 idempotence).
pub async fn find(
    pool: &PgPool,
    venue_id: &str,
    kind: &str,
    period: &str,
) -> Result<Option<ConfidenceReview>> {
    let row = sqlx::query_as::<_, ConfidenceReview>(
        "SELECT * FROM reviews WHERE venue_id = $1 AND type = $2 AND period = $3",
    )
    .bind(venue_id)
    .bind(kind)
    .bind(period)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Entries awaiting a human decision (spec §4.8 "`unsure` ... surfaces in
/// the daily report as an action item").
pub async fn list_unsure(pool: &PgPool) -> Result<Vec<ConfidenceReview>> {
    let rows = sqlx::query_as::<_, ConfidenceReview>(
        "SELECT * FROM reviews WHERE llm_decision = 'unsure' ORDER BY applied_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn record_decision(
    pool: &PgPool,
    venue_id: &str,
    kind: &str,
    period: &str,
    heuristic_score: f32,
    llm_decision: Option<LlmDecision>,
    llm_reasoning: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews (venue_id, type, period, heuristic_score, llm_decision, llm_reasoning, applied_at)
        VALUES ($1, $2, $3, $4, $5, $6, now())
        ON CONFLICT (venue_id, type, period) DO UPDATE SET
            heuristic_score = EXCLUDED.heuristic_score,
            llm_decision = EXCLUDED.llm_decision,
            llm_reasoning = EXCLUDED.llm_reasoning,
            applied_at = now()
        "#,
    )
    .bind(venue_id)
    .bind(kind)
    .bind(period)
    .bind(heuristic_score)
    .bind(llm_decision)
    .bind(llm_reasoning)
    .execute(pool)
    .await?;
    Ok(())
}
