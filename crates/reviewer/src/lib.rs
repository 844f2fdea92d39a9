//! Heuristic + LLM confidence review for extracted promotion entries
//! (spec §4.8). The reviews table key `(venue_id, type, period)` survives
//! across runs, so a decision once applied is never re-asked.

pub mod error;
pub mod response;
pub mod scoring;

pub use error::{ReviewError, Result};
pub use scoring::heuristic_score;

use llm_client::{ChatProvider, ChatRequest, Message};
use spotcast_common::config::HeuristicConfig;
use spotcast_common::{LlmDecision, PromotionEntry};
use sqlx::PgPool;
use tracing::info;

const SYSTEM_PROMPT: &str = "You are reviewing a borderline recurring-special extraction. \
Respond with strict JSON: { \"decision\": \"accept\" | \"reject\" | \"unsure\", \"reasoning\": string }. \
Accept only if the entry plausibly describes a genuinely recurring schedule.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Accept,
    Reject,
    Unsure,
}

impl From<LlmDecision> for ReviewOutcome {
    fn from(d: LlmDecision) -> Self {
        match d {
            LlmDecision::Accept => ReviewOutcome::Accept,
            LlmDecision::Reject => ReviewOutcome::Reject,
            LlmDecision::Unsure => ReviewOutcome::Unsure,
        }
    }
}

/// Reviews one promotion entry, applying the heuristic tiers and, for
/// borderline scores, asking the LLM. Reuses any decision already recorded
/// for `(venue_id, type, period)` instead of re-asking.
#[allow(clippy::too_many_arguments)]
pub async fn review_entry(
    pool: &PgPool,
    provider: &dyn ChatProvider,
    model: &str,
    heuristic: &HeuristicConfig,
    venue_id: &str,
    period: &str,
    entry: &PromotionEntry,
    source_text: &str,
) -> Result<ReviewOutcome> {
    if let Some(existing) =
        spotcast_store::reviews::find(pool, venue_id, &entry.kind, period).await?
    {
        if let Some(decision) = existing.llm_decision {
            return Ok(decision.into());
        }
        if existing.heuristic_score >= heuristic.t_high {
            return Ok(ReviewOutcome::Accept);
        }
        if existing.heuristic_score < heuristic.t_low {
            return Ok(ReviewOutcome::Reject);
        }
    }

    let score = scoring::heuristic_score(entry, source_text);

    if score >= heuristic.t_high {
        spotcast_store::reviews::record_decision(pool, venue_id, &entry.kind, period, score, None, None)
            .await?;
        return Ok(ReviewOutcome::Accept);
    }

    if score < heuristic.t_low {
        spotcast_store::reviews::record_decision(pool, venue_id, &entry.kind, period, score, None, None)
            .await?;
        return Ok(ReviewOutcome::Reject);
    }

    info!(venue_id, kind = %entry.kind, score, "reviewer: borderline score, asking LLM");
    let request = ChatRequest::new(
        model,
        vec![Message::system(SYSTEM_PROMPT), Message::user(review_prompt(entry, source_text))],
        0.2,
    );

    let outcome = match provider.chat(&request).await {
        Ok(raw) => match response::parse_response(&raw) {
            Ok(parsed) => {
                spotcast_store::reviews::record_decision(
                    pool,
                    venue_id,
                    &entry.kind,
                    period,
                    score,
                    Some(parsed.decision),
                    Some(&parsed.reasoning),
                )
                .await?;
                parsed.decision.into()
            }
            Err(_) => {
                spotcast_store::reviews::record_decision(pool, venue_id, &entry.kind, period, score, None, None)
                    .await?;
                ReviewOutcome::Unsure
            }
        },
        Err(_) => {
            spotcast_store::reviews::record_decision(pool, venue_id, &entry.kind, period, score, None, None)
                .await?;
            ReviewOutcome::Unsure
        }
    };

    Ok(outcome)
}

fn review_prompt(entry: &PromotionEntry, source_text: &str) -> String {
    format!(
        "Entry: type={}, days={:?}, times={:?}, label={:?}, specials={:?}\n\nSource text:\n{}",
        entry.kind, entry.days, entry.times, entry.label, entry.specials, source_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::MockProvider;

    fn entry() -> PromotionEntry {
        PromotionEntry {
            kind: "happy-hour".to_string(),
            days: Some("daily".to_string()),
            times: None,
            label: None,
            specials: vec![],
        }
    }

    #[test]
    fn from_llm_decision_maps_variants() {
        assert_eq!(ReviewOutcome::from(LlmDecision::Accept), ReviewOutcome::Accept);
        assert_eq!(ReviewOutcome::from(LlmDecision::Reject), ReviewOutcome::Reject);
        assert_eq!(ReviewOutcome::from(LlmDecision::Unsure), ReviewOutcome::Unsure);
    }

    #[test]
    fn review_prompt_includes_entry_fields() {
        let prompt = review_prompt(&entry(), "some source text");
        assert!(prompt.contains("happy-hour"));
        assert!(prompt.contains("some source text"));
    }

    #[tokio::test]
    async fn mock_provider_parses_into_outcome() {
        let provider = MockProvider::new(vec![r#"{"decision": "accept", "reasoning": "ok"}"#.to_string()]);
        let request = ChatRequest::new("gpt-4o-mini", vec![Message::user("hi")], 0.2);
        let raw = provider.chat(&request).await.unwrap();
        let parsed = response::parse_response(&raw).unwrap();
        assert_eq!(ReviewOutcome::from(parsed.decision), ReviewOutcome::Accept);
    }
}
