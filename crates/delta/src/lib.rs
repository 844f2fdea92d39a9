//! Computes a normalized content hash per venue and partitions venues
//! into new/changed/unchanged, copying the LLM work-set into
//! `silver_trimmed/incremental/` (spec §4.6).

pub mod error;
pub mod normalize;

pub use error::{DeltaError, Result};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spotcast_common::TrimmedDocument;
use spotcast_datafs::DataRoot;
use tracing::info;

const PAGE_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaClass {
    New,
    Changed,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaSummary {
    pub date: NaiveDate,
    #[serde(rename = "previousDate")]
    pub previous_date: Option<NaiveDate>,
    pub new: Vec<String>,
    pub changed: Vec<String>,
    pub unchanged: Vec<String>,
    pub summary: String,
}

/// Hashes every venue in `silver_trimmed/all`, compares against
/// `silver_trimmed/previous`, copies new/changed venues into
/// `silver_trimmed/incremental`, then rotates `all` into `previous` for
/// tomorrow's comparison. Returns the work-set of venue ids to extract.
pub async fn run_delta(
    data_root: &DataRoot,
    venue_ids: &[String],
    today: NaiveDate,
    previous_date: Option<NaiveDate>,
) -> Result<DeltaSummary> {
    let incremental_dir = data_root.trimmed_incremental_dir();
    if tokio::fs::try_exists(&incremental_dir).await? {
        tokio::fs::remove_dir_all(&incremental_dir).await?;
    }
    tokio::fs::create_dir_all(&incremental_dir).await?;

    let mut new = Vec::new();
    let mut changed = Vec::new();
    let mut unchanged = Vec::new();

    for venue_id in venue_ids {
        match classify_venue(data_root, venue_id).await? {
            Some(DeltaClass::New) => new.push(venue_id.clone()),
            Some(DeltaClass::Changed) => changed.push(venue_id.clone()),
            Some(DeltaClass::Unchanged) => unchanged.push(venue_id.clone()),
            None => {}
        }
    }

    for venue_id in new.iter().chain(changed.iter()) {
        copy_to_incremental(data_root, venue_id).await?;
    }

    rotate_trimmed(data_root, venue_ids).await?;

    let summary = DeltaSummary {
        date: today,
        previous_date,
        summary: format!(
            "{} new, {} changed, {} unchanged",
            new.len(),
            changed.len(),
            unchanged.len()
        ),
        new,
        changed,
        unchanged,
    };

    spotcast_datafs::write_json_ensuring_dir(&data_root.delta_summary_path(), &summary).await?;
    info!(%summary.summary, "delta: partitioned venues");

    Ok(summary)
}

async fn classify_venue(data_root: &DataRoot, venue_id: &str) -> Result<Option<DeltaClass>> {
    let Some(today_doc) =
        spotcast_datafs::read_json::<TrimmedDocument>(&data_root.trimmed_all_path(venue_id)).await?
    else {
        return Ok(None);
    };
    let today_hash = hash_document(&today_doc);

    let Some(previous_doc) =
        spotcast_datafs::read_json::<TrimmedDocument>(&data_root.trimmed_previous_path(venue_id))
            .await?
    else {
        return Ok(Some(DeltaClass::New));
    };
    let previous_hash = hash_document(&previous_doc);

    Ok(Some(if today_hash == previous_hash {
        DeltaClass::Unchanged
    } else {
        DeltaClass::Changed
    }))
}

/// The normalized-content hash identifying a trimmed document's
/// meaningful text, independent of incidental formatting noise.
pub fn hash_document(doc: &TrimmedDocument) -> String {
    let joined = doc
        .pages
        .iter()
        .map(|p| normalize::normalize(&p.text))
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);
    spotcast_common::source_hash(&joined)
}

async fn copy_to_incremental(data_root: &DataRoot, venue_id: &str) -> Result<()> {
    let src = data_root.trimmed_all_path(venue_id);
    let dst = data_root.trimmed_incremental_path(venue_id);
    if let Some(parent) = dst.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(&src, &dst).await?;
    Ok(())
}

async fn rotate_trimmed(data_root: &DataRoot, venue_ids: &[String]) -> Result<()> {
    tokio::fs::create_dir_all(data_root.trimmed_previous_dir()).await?;
    for venue_id in venue_ids {
        let src = data_root.trimmed_all_path(venue_id);
        if tokio::fs::try_exists(&src).await? {
            tokio::fs::copy(&src, &data_root.trimmed_previous_path(venue_id)).await?;
        }
    }
    Ok(())
}
