//! LLM-driven extraction of recurring specials from trimmed venue text
//! (spec §4.7). Gated by a per-run file budget and a source-hash check
//! against the existing gold record.

pub mod error;
pub mod prompt;
pub mod response;

pub use error::{ExtractError, Result};

use std::sync::Arc;

use llm_client::{ChatProvider, ChatRequest, LlmError, Message};
use spotcast_common::config::RetryConfig;
use spotcast_common::retry::backoff_duration;
use spotcast_common::{Config, ExtractionMethod, GoldRecord, Promotions, Venue};
use spotcast_datafs::DataRoot;
use sqlx::PgPool;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Completed { processed: usize, skipped_unchanged: usize, failed: usize },
    Skipped { reason: String },
}

/// One-shot bulk extraction over every venue, run once before the
/// `.bulk-complete` sentinel exists. No file-count budget applies.
pub async fn run_bulk(
    data_root: &DataRoot,
    pool: &PgPool,
    provider: Arc<dyn ChatProvider>,
    config: &Config,
    venues: &[Venue],
) -> Result<ExtractionOutcome> {
    let (processed, skipped_unchanged, failed) = process_venues(
        data_root,
        pool,
        provider,
        config,
        venues,
        ExtractionMethod::Bulk,
        data_root.trimmed_all_dir(),
    )
    .await?;

    if processed > 0 {
        spotcast_datafs::write_json_ensuring_dir(&data_root.gold_bulk_complete_sentinel(), &true)
            .await?;
    }

    info!(processed, skipped_unchanged, failed, "extractor: bulk pass complete");
    Ok(ExtractionOutcome::Completed { processed, skipped_unchanged, failed })
}

/// Incremental extraction over the delta-selected work-set. Refuses to
/// run until the bulk sentinel exists, and skips entirely if the
/// work-set exceeds `max_incremental_files` (spec §4.7).
pub async fn run_incremental(
    data_root: &DataRoot,
    pool: &PgPool,
    provider: Arc<dyn ChatProvider>,
    config: &Config,
    venues: &[Venue],
) -> Result<ExtractionOutcome> {
    if !tokio::fs::try_exists(data_root.gold_bulk_complete_sentinel()).await? {
        return Ok(ExtractionOutcome::Skipped {
            reason: "bulk extraction has not completed yet".to_string(),
        });
    }

    let cap = config.budget.max_incremental_files;
    if venues.len() > cap {
        return Ok(ExtractionOutcome::Skipped {
            reason: format!("LLM limit hit: {} > {cap}", venues.len()),
        });
    }

    let (processed, skipped_unchanged, failed) = process_venues(
        data_root,
        pool,
        provider,
        config,
        venues,
        ExtractionMethod::Incremental,
        data_root.trimmed_incremental_dir(),
    )
    .await?;

    info!(processed, skipped_unchanged, failed, "extractor: incremental pass complete");
    Ok(ExtractionOutcome::Completed { processed, skipped_unchanged, failed })
}

async fn process_venues(
    data_root: &DataRoot,
    pool: &PgPool,
    provider: Arc<dyn ChatProvider>,
    config: &Config,
    venues: &[Venue],
    method: ExtractionMethod,
    trimmed_dir: std::path::PathBuf,
) -> Result<(usize, usize, usize)> {
    let semaphore = Arc::new(tokio::sync::Semaphore::new(config.budget.extractor_concurrency.max(1)));
    let mut tasks = Vec::with_capacity(venues.len());

    for venue in venues {
        let venue = venue.clone();
        let provider = provider.clone();
        let semaphore = semaphore.clone();
        let config = config.clone();
        let pool = pool.clone();
        let data_root = data_root.clone();
        let trimmed_path = trimmed_dir.join(format!("{}.json", venue.id));
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore never closed");
            extract_venue(&data_root, &pool, provider.as_ref(), &config, &venue, method, &trimmed_path)
                .await
        }));
    }

    let mut processed = 0;
    let mut skipped_unchanged = 0;
    let mut failed = 0;
    for task in tasks {
        match task.await {
            Ok(Ok(VenueOutcome::Extracted)) => processed += 1,
            Ok(Ok(VenueOutcome::Unchanged)) => skipped_unchanged += 1,
            Ok(Ok(VenueOutcome::MissingInput)) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "extractor: venue processing failed");
                failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "extractor: task panicked");
                failed += 1;
            }
        }
    }

    Ok((processed, skipped_unchanged, failed))
}

enum VenueOutcome {
    Extracted,
    Unchanged,
    MissingInput,
}

async fn extract_venue(
    data_root: &DataRoot,
    pool: &PgPool,
    provider: &dyn ChatProvider,
    config: &Config,
    venue: &Venue,
    method: ExtractionMethod,
    trimmed_path: &std::path::Path,
) -> Result<VenueOutcome> {
    let Some(doc) =
        spotcast_datafs::read_json::<spotcast_common::TrimmedDocument>(trimmed_path).await?
    else {
        return Ok(VenueOutcome::MissingInput);
    };

    let source_hash = spotcast_delta::hash_document(&doc);
    let existing_hash = spotcast_store::gold::source_hash(pool, &venue.id).await?;
    if existing_hash.as_deref() == Some(source_hash.as_str()) {
        return Ok(VenueOutcome::Unchanged);
    }

    let pages_text =
        doc.pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\n---\n\n");

    let record = match call_with_retry(provider, config, venue, &pages_text).await {
        Ok(parsed) => GoldRecord {
            venue_id: venue.id.clone(),
            venue_name: venue.name.clone(),
            extracted_at: chrono::Utc::now(),
            extraction_method: method,
            source_hash,
            source_modified_at: doc.scraped_at,
            needs_llm: false,
            confidence: 0.0,
            promotions: parsed.promotions,
        },
        Err(e) => {
            warn!(venue_id = %venue.id, error = %e, "extractor: permanent failure, recording needsLLM");
            GoldRecord {
                venue_id: venue.id.clone(),
                venue_name: venue.name.clone(),
                extracted_at: chrono::Utc::now(),
                extraction_method: method,
                source_hash,
                source_modified_at: doc.scraped_at,
                needs_llm: true,
                confidence: 0.0,
                promotions: Promotions::NotFound,
            }
        }
    };

    spotcast_store::gold::upsert(pool, &record).await?;
    spotcast_datafs::write_json_ensuring_dir(&data_root.gold_path(&venue.id), &record).await?;

    Ok(VenueOutcome::Extracted)
}

/// Calls the LLM with up to `retry.max_attempts` transient retries, plus
/// one JSON-repair pass if the response doesn't parse (spec §4.7).
async fn call_with_retry(
    provider: &dyn ChatProvider,
    config: &Config,
    venue: &Venue,
    pages_text: &str,
) -> Result<response::ParsedExtraction> {
    let retry: RetryConfig = config.retry;
    let mut messages =
        vec![Message::system(prompt::SYSTEM_PROMPT), Message::user(prompt::user_prompt(venue, pages_text))];
    let mut repaired_once = false;

    for attempt in 0..retry.max_attempts.max(1) {
        let request = ChatRequest::new(&config.llm_model, messages.clone(), 0.2);
        match provider.chat(&request).await {
            Ok(raw) => match response::parse_response(&raw) {
                Ok(parsed) => return Ok(parsed),
                Err(parse_err) => {
                    if !repaired_once {
                        repaired_once = true;
                        messages.push(Message::user(prompt::repair_prompt(&parse_err)));
                        continue;
                    }
                    return Err(ExtractError::Llm(LlmError::Parse(parse_err)));
                }
            },
            Err(e) => {
                if attempt + 1 >= retry.max_attempts {
                    return Err(ExtractError::Llm(e));
                }
                tokio::time::sleep(backoff_duration(&retry, attempt)).await;
            }
        }
    }

    Err(ExtractError::Llm(LlmError::Api("retries exhausted".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::MockProvider;
    use spotcast_common::config::{BudgetConfig, HeuristicConfig};

    fn venue(id: &str) -> Venue {
        Venue {
            id: id.to_string(),
            name: "Test Venue".to_string(),
            lat: 0.0,
            lng: 0.0,
            area: Some("downtown".to_string()),
            address: None,
            website: Some("https://example.com".to_string()),
            zip_codes: Vec::new(),
            address_components: serde_json::json!({}),
            operating_hours: serde_json::json!({}),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn test_config() -> Config {
        Config {
            data_dir: "./data".to_string(),
            database_url: String::new(),
            llm_api_key: String::new(),
            llm_model: "gpt-4o-mini".to_string(),
            google_places_api_key: String::new(),
            google_places_enabled: false,
            admin_webhook_secret: String::new(),
            budget: BudgetConfig::default(),
            heuristic: HeuristicConfig::default(),
            retry: RetryConfig { base_ms: 1, cap_ms: 2, max_attempts: 3 },
        }
    }

    #[tokio::test]
    async fn repair_pass_recovers_from_malformed_first_reply() {
        let provider = MockProvider::new(vec![
            "not json".to_string(),
            r#"{"found": true, "entries": [{"type": "happy-hour", "days": "daily", "times": "4-7pm", "label": null, "specials": ["$5 wells"]}], "reasoning": "ok"}"#.to_string(),
        ]);
        let config = test_config();
        let v = venue("v1");
        let parsed = call_with_retry(&provider, &config, &v, "happy hour daily 4-7pm").await.unwrap();
        assert!(parsed.promotions.found());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn permanent_parse_failure_after_repair_bubbles_up() {
        let provider = MockProvider::new(vec!["still not json".to_string(), "still not json".to_string()]);
        let config = test_config();
        let v = venue("v1");
        let result = call_with_retry(&provider, &config, &v, "text").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn transient_errors_retry_then_succeed() {
        let provider = MockProvider::with_results(vec![
            Err("temporary".to_string()),
            Ok(r#"{"found": false, "entries": [], "reasoning": "nothing recurring"}"#.to_string()),
        ]);
        let config = test_config();
        let v = venue("v1");
        let parsed = call_with_retry(&provider, &config, &v, "text").await.unwrap();
        assert!(!parsed.promotions.found());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn not_found_is_a_terminal_valid_answer() {
        let provider = MockProvider::new(vec![
            r#"{"found": false, "entries": [], "reasoning": "no recurring schedule mentioned"}"#.to_string(),
        ]);
        let config = test_config();
        let v = venue("v1");
        let parsed = call_with_retry(&provider, &config, &v, "Open daily, no specials.").await.unwrap();
        assert!(!parsed.promotions.found());
    }

    #[tokio::test]
    async fn incremental_run_skips_when_work_set_exceeds_budget() {
        let dir = std::env::temp_dir().join(format!("spotcast-extractor-budget-test-{}", std::process::id()));
        let data_root = DataRoot::new(&dir);
        tokio::fs::create_dir_all(dir.join("gold")).await.unwrap();
        tokio::fs::write(data_root.gold_bulk_complete_sentinel(), "true").await.unwrap();

        let mut config = test_config();
        config.budget.max_incremental_files = 50;
        let venues: Vec<Venue> = (0..137).map(|i| venue(&format!("v{i}"))).collect();
        let provider: Arc<dyn ChatProvider> = Arc::new(MockProvider::new(Vec::new()));
        let pool = sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://unused/unused").unwrap();

        let outcome = run_incremental(&data_root, &pool, provider, &config, &venues).await.unwrap();
        match outcome {
            ExtractionOutcome::Skipped { reason } => assert!(reason.contains("137 > 50"), "{reason}"),
            other => panic!("expected Skipped, got {other:?}"),
        }
    }
}
