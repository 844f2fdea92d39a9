//! Per-venue concurrent HTTP download of candidate pages into a
//! content-addressed on-disk layout with daily rotation (spec §4.3).

pub mod candidates;
pub mod client;
pub mod error;
pub mod rotation;

pub use error::{FetchError, Result};
pub use rotation::{rotate, RotationOutcome};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use spotcast_common::config::RetryConfig;
use spotcast_common::{url_hash, Venue};
use spotcast_datafs::DataRoot;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use client::FetchOutcome;

/// Run-scoped counters for per-URL failure classes (spec §4.3 "classified
/// and counted in a run-scoped stats object").
#[derive(Debug, Default)]
pub struct FetchStats {
    pub successes: AtomicU64,
    pub skipped_cached: AtomicU64,
    pub rejected: AtomicU64,
    pub timeout: AtomicU64,
    pub dns: AtomicU64,
    pub refused: AtomicU64,
    pub status_4xx: AtomicU64,
    pub status_429: AtomicU64,
    pub status_5xx: AtomicU64,
    pub ssl: AtomicU64,
    pub other: AtomicU64,
}

impl FetchStats {
    fn record_failure(&self, kind: spotcast_common::retry::FailureKind) {
        use spotcast_common::retry::FailureKind::*;
        let counter = match kind {
            Timeout => &self.timeout,
            Dns => &self.dns,
            Refused => &self.refused,
            Status4xx => &self.status_4xx,
            Status429 => &self.status_429,
            Status5xx => &self.status_5xx,
            Ssl => &self.ssl,
            Other => &self.other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_failures(&self) -> u64 {
        self.timeout.load(Ordering::Relaxed)
            + self.dns.load(Ordering::Relaxed)
            + self.refused.load(Ordering::Relaxed)
            + self.status_4xx.load(Ordering::Relaxed)
            + self.status_429.load(Ordering::Relaxed)
            + self.status_5xx.load(Ordering::Relaxed)
            + self.ssl.load(Ordering::Relaxed)
            + self.other.load(Ordering::Relaxed)
    }
}

/// Fetches every venue's candidate pages concurrently, bounded by
/// `fetcher_concurrency` across all venues' URLs (spec §5).
pub async fn fetch_all(
    data_root: &DataRoot,
    venues: &[Venue],
    per_url_timeout_ms: u64,
    concurrency: usize,
    retry: &RetryConfig,
) -> Arc<FetchStats> {
    let http = client::build_client(per_url_timeout_ms);
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let stats = Arc::new(FetchStats::default());

    let mut tasks = Vec::with_capacity(venues.len());
    for venue in venues {
        let data_root = data_root.clone();
        let http = http.clone();
        let semaphore = semaphore.clone();
        let stats = stats.clone();
        let retry = *retry;
        let venue = venue.clone();
        tasks.push(tokio::spawn(async move {
            fetch_venue(&data_root, &venue, &http, &semaphore, &stats, &retry).await;
        }));
    }

    for task in tasks {
        let _ = task.await;
    }

    stats
}

async fn fetch_venue(
    data_root: &DataRoot,
    venue: &Venue,
    http: &reqwest::Client,
    semaphore: &Arc<Semaphore>,
    stats: &FetchStats,
    retry: &RetryConfig,
) {
    let Some(website) = venue.website.as_deref() else {
        return;
    };

    let venue_dir = data_root.raw_today_venue_dir(&venue.id);
    if let Err(e) = tokio::fs::create_dir_all(&venue_dir).await {
        warn!(venue_id = %venue.id, error = %e, "failed to create venue raw dir");
        return;
    }

    let metadata_path = data_root.raw_today_metadata(&venue.id);
    let mut metadata: HashMap<String, String> =
        spotcast_datafs::read_json_opt(&metadata_path).await.ok().flatten().unwrap_or_default();

    for url in candidates::candidate_urls(website) {
        let hash = url_hash(&url);
        let page_path = data_root.raw_today_page(&venue.id, &hash);

        if let Ok(meta) = tokio::fs::metadata(&page_path).await {
            if let Ok(mtime) = meta.modified() {
                if rotation::is_from_today(mtime) {
                    stats.skipped_cached.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            }
        }

        let _permit = semaphore.acquire().await.expect("semaphore never closed");
        match client::fetch_with_retry(http, &url, retry).await {
            FetchOutcome::Success { bytes, truncated } => {
                if let Err(e) = spotcast_datafs::atomic_write_bytes(&page_path, &bytes).await {
                    warn!(url, error = %e, "failed to write fetched page");
                    continue;
                }
                metadata.insert(hash, url.clone());
                stats.successes.fetch_add(1, Ordering::Relaxed);
                if truncated {
                    info!(url, "page truncated at body cap");
                }
            }
            FetchOutcome::Rejected(reason) => {
                stats.rejected.fetch_add(1, Ordering::Relaxed);
                info!(url, reason, "rejected non-html response");
            }
            FetchOutcome::Failed(kind) => {
                stats.record_failure(kind);
                warn!(url, ?kind, "fetch failed");
            }
        }
    }

    if let Err(e) = spotcast_datafs::write_json_ensuring_dir(&metadata_path, &metadata).await {
        warn!(venue_id = %venue.id, error = %e, "failed to write venue metadata");
    }
}
