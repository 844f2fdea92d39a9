//! Sequences every stage into a single run with a manifest, step
//! statuses, skip propagation, and backup (spec §4.10).

pub mod backup;
pub mod error;
pub mod manifest;
pub mod report;

pub use error::{OrchestratorError, Result};
pub use manifest::Manifest;

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use llm_client::ChatProvider;
use spotcast_common::{Config, Promotions, RunStatus, StepRecord, StepStatus, TrimmedDocument, Venue};
use spotcast_datafs::DataRoot;
use sqlx::PgPool;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: i64,
    pub status: RunStatus,
    pub steps: BTreeMap<String, StepRecord>,
}

/// Transitions any run stuck in `running` past the stale threshold to
/// `failed_stale` (spec §4.10 "Stale-run recovery"). Call once at process
/// startup, before `run_pipeline`.
pub async fn recover_stale_runs(pool: &PgPool, config: &Config) -> Result<u64> {
    let threshold = Utc::now() - chrono::Duration::milliseconds(config.budget.stale_run_threshold_ms);
    let recovered = spotcast_store::runs::recover_stale_runs(pool, threshold).await?;
    if recovered > 0 {
        warn!(count = recovered, "orchestrator: recovered stale runs");
    }
    Ok(recovered)
}

/// Runs rotate → fetch → merge → trim → delta → extract → review →
/// materialize → cleanup, recording step outcomes to both the
/// `pipeline_runs` row and the on-disk manifest as it goes.
pub async fn run_pipeline(
    data_root: &DataRoot,
    pool: &PgPool,
    config: &Config,
    provider: Arc<dyn ChatProvider>,
    area_filter: Option<&str>,
) -> Result<PipelineOutcome> {
    if spotcast_store::runs::any_running(pool).await? {
        return Err(OrchestratorError::Integrity(
            "a pipeline run is already in progress".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let run_date = today.format("%Y%m%d").to_string();

    if let Err(e) = backup::snapshot(data_root, &config.database_url, &run_date).await {
        warn!(error = %e, "orchestrator: backup failed, continuing run");
    } else if let Err(e) = backup::prune(data_root, config.budget.backup_retain).await {
        warn!(error = %e, "orchestrator: backup prune failed");
    }

    let run_id = spotcast_store::runs::start(pool, &run_date, area_filter).await?;
    let mut steps = spotcast_store::runs::empty_steps();
    let mut manifest = Manifest {
        run_id,
        run_date: run_date.clone(),
        area_filter: area_filter.map(String::from),
        status: RunStatus::Running,
        started_at: Utc::now(),
        finished_at: None,
        steps: steps.clone(),
    };
    manifest::write(data_root, &manifest).await?;

    let venues = match area_filter {
        Some(area) => spotcast_store::venues::list_by_area(pool, area).await?,
        None => spotcast_store::venues::list_all(pool).await?,
    };

    let rotation = spotcast_fetcher::rotate(data_root).await?;
    record_step(pool, &mut steps, run_id, "rotate", StepStatus::Completed, Some(format!("{rotation:?}"))).await?;
    sync_manifest(data_root, &mut manifest, &steps).await?;

    let fetch_stats = spotcast_fetcher::fetch_all(
        data_root,
        &venues,
        config.budget.per_url_timeout_ms,
        config.budget.fetcher_concurrency,
        &config.retry,
    )
    .await;
    let fetched_anything = fetch_stats.successes.load(Ordering::Relaxed) > 0 || fetch_stats.skipped_cached.load(Ordering::Relaxed) > 0;
    let fetch_hard_failure = !venues.is_empty() && !fetched_anything;
    record_step(
        pool,
        &mut steps,
        run_id,
        "fetch",
        if fetch_hard_failure { StepStatus::Failed } else { StepStatus::Completed },
        fetch_hard_failure.then(|| "zero files written".to_string()),
    )
    .await?;
    sync_manifest(data_root, &mut manifest, &steps).await?;

    if fetch_hard_failure {
        for name in ["merge", "trim", "delta", "extract"] {
            record_step(pool, &mut steps, run_id, name, StepStatus::Skipped, Some("fetcher wrote zero files".to_string())).await?;
        }
        sync_manifest(data_root, &mut manifest, &steps).await?;
        materialize_and_cleanup(pool, data_root, run_id, &mut steps, today).await?;
        return finish_run(data_root, pool, run_id, &mut manifest, steps, RunStatus::Completed).await;
    }

    let merged = spotcast_merger::merge_all(data_root, &venues).await?;
    record_step(pool, &mut steps, run_id, "merge", StepStatus::Completed, Some(format!("{merged} venues merged"))).await?;
    sync_manifest(data_root, &mut manifest, &steps).await?;

    let venue_ids: Vec<String> = venues.iter().map(|v| v.id.clone()).collect();
    let trimmed = spotcast_trimmer::trim_all(data_root, &venue_ids).await?;
    record_step(pool, &mut steps, run_id, "trim", StepStatus::Completed, Some(format!("{trimmed} venues trimmed"))).await?;
    sync_manifest(data_root, &mut manifest, &steps).await?;

    let previous_date = today.pred_opt();
    let delta = spotcast_delta::run_delta(data_root, &venue_ids, today, previous_date).await?;
    record_step(pool, &mut steps, run_id, "delta", StepStatus::Completed, Some(delta.summary.clone())).await?;
    sync_manifest(data_root, &mut manifest, &steps).await?;

    let work_set: Vec<Venue> =
        venues.iter().filter(|v| delta.new.contains(&v.id) || delta.changed.contains(&v.id)).cloned().collect();
    let bulk_done = tokio::fs::try_exists(data_root.gold_bulk_complete_sentinel()).await?;

    let outcome = if !bulk_done {
        spotcast_extractor::run_bulk(data_root, pool, provider.clone(), config, &venues).await?
    } else {
        spotcast_extractor::run_incremental(data_root, pool, provider.clone(), config, &work_set).await?
    };
    match &outcome {
        spotcast_extractor::ExtractionOutcome::Completed { processed, skipped_unchanged, failed } => {
            record_step(
                pool,
                &mut steps,
                run_id,
                "extract",
                StepStatus::Completed,
                Some(format!("processed={processed} skipped={skipped_unchanged} failed={failed}")),
            )
            .await?;
        }
        spotcast_extractor::ExtractionOutcome::Skipped { reason } => {
            record_step(pool, &mut steps, run_id, "extract", StepStatus::Skipped, Some(reason.clone())).await?;
        }
    }
    sync_manifest(data_root, &mut manifest, &steps).await?;

    let reviewed = if bulk_done { &work_set } else { &venues };
    review_gold_entries(pool, data_root, provider.as_ref(), config, reviewed, bulk_done).await?;

    materialize_and_cleanup(pool, data_root, run_id, &mut steps, today).await?;
    sync_manifest(data_root, &mut manifest, &steps).await?;

    finish_run(data_root, pool, run_id, &mut manifest, steps, RunStatus::Completed).await
}

/// Filters each freshly-extracted venue's promotion entries through the
/// confidence reviewer before materialization (spec §4.8 "accept promotes
/// to the gold record, reject drops the entry").
async fn review_gold_entries(
    pool: &PgPool,
    data_root: &DataRoot,
    provider: &dyn ChatProvider,
    config: &Config,
    venues: &[Venue],
    bulk_done: bool,
) -> Result<()> {
    for venue in venues {
        let Some(mut gold) = spotcast_store::gold::find_by_venue(pool, &venue.id).await? else {
            continue;
        };
        let Promotions::Found(entries) = gold.promotions.clone() else {
            continue;
        };
        if entries.is_empty() {
            continue;
        }

        let trimmed_path =
            if bulk_done { data_root.trimmed_incremental_path(&venue.id) } else { data_root.trimmed_all_path(&venue.id) };
        let source_text = match spotcast_datafs::read_json::<TrimmedDocument>(&trimmed_path).await {
            Ok(Some(doc)) => doc.pages.into_iter().map(|p| p.text).collect::<Vec<_>>().join("\n"),
            _ => String::new(),
        };

        let mut kept = Vec::with_capacity(entries.len());
        for entry in &entries {
            let period = entry.days.clone().unwrap_or_default();
            let outcome = spotcast_reviewer::review_entry(
                pool,
                provider,
                &config.llm_model,
                &config.heuristic,
                &venue.id,
                &period,
                entry,
                &source_text,
            )
            .await?;
            match outcome {
                spotcast_reviewer::ReviewOutcome::Reject => {}
                spotcast_reviewer::ReviewOutcome::Accept | spotcast_reviewer::ReviewOutcome::Unsure => kept.push(entry.clone()),
            }
        }

        if kept.len() != entries.len() {
            gold.promotions = if kept.is_empty() { Promotions::NotFound } else { Promotions::Found(kept) };
            spotcast_store::gold::upsert(pool, &gold).await?;
        }
    }
    Ok(())
}

async fn materialize_and_cleanup(
    pool: &PgPool,
    data_root: &DataRoot,
    run_id: i64,
    steps: &mut BTreeMap<String, StepRecord>,
    run_date: NaiveDate,
) -> Result<()> {
    let records = spotcast_store::gold::list_found(pool).await?;
    let stats = spotcast_materializer::materialize_all(pool, &records, run_date).await?;
    record_step(
        pool,
        steps,
        run_id,
        "materialize",
        StepStatus::Completed,
        Some(format!("created={} updated={} unchanged={}", stats.created, stats.updated, stats.unchanged)),
    )
    .await?;

    let approved = spotcast_store::spots::list_approved(pool).await?;
    spotcast_datafs::write_json_ensuring_dir(&data_root.reporting_spots_path(), &approved).await?;
    record_step(pool, steps, run_id, "cleanup", StepStatus::Completed, Some(format!("{} spots snapshotted", approved.len()))).await?;
    Ok(())
}

async fn record_step(
    pool: &PgPool,
    steps: &mut BTreeMap<String, StepRecord>,
    run_id: i64,
    name: &str,
    status: StepStatus,
    reason: Option<String>,
) -> Result<()> {
    let now = Utc::now();
    let record = StepRecord { status, started_at: now, finished_at: Some(now), reason };
    spotcast_store::runs::record_step(pool, run_id, name, &record).await?;
    info!(run_id, step = name, status = ?status, "orchestrator: step recorded");
    steps.insert(name.to_string(), record);
    Ok(())
}

async fn sync_manifest(data_root: &DataRoot, manifest: &mut Manifest, steps: &BTreeMap<String, StepRecord>) -> Result<()> {
    manifest.steps = steps.clone();
    manifest::write(data_root, manifest).await
}

async fn finish_run(
    data_root: &DataRoot,
    pool: &PgPool,
    run_id: i64,
    manifest: &mut Manifest,
    steps: BTreeMap<String, StepRecord>,
    status: RunStatus,
) -> Result<PipelineOutcome> {
    spotcast_store::runs::finish(pool, run_id, status).await?;
    manifest.status = status;
    manifest.finished_at = Some(Utc::now());
    manifest.steps = steps.clone();
    manifest::write(data_root, manifest).await?;
    info!(run_id, status = ?status, "orchestrator: run complete");
    Ok(PipelineOutcome { run_id, status, steps })
}
