use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use spotcast_datafs::DataRoot;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// `raw/today` held yesterday's (or older) content; it was archived to
    /// `raw/previous` and a fresh `raw/today` was created.
    Rotated,
    /// `raw/today` already holds today's content (same-day rerun).
    AlreadyCurrent,
    /// `raw/today` didn't exist or was empty; nothing to rotate.
    NoPriorData,
}

/// A file's mtime falls within the current local calendar day (spec §4.3
/// "Per-URL cache discipline").
pub fn is_from_today(mtime: SystemTime) -> bool {
    let dt: DateTime<Local> = mtime.into();
    dt.date_naive() == Local::now().date_naive()
}

/// Daily rotation, invoked exactly once per day by the orchestrator before
/// any fetch. Atomic sequence: delete `raw/previous`, rename `raw/today` to
/// `raw/previous`, create empty `raw/today` (spec §4.3).
pub async fn rotate(data_root: &DataRoot) -> Result<RotationOutcome> {
    let today_root = data_root.raw_today_root();
    let previous_root = data_root.raw_previous_root();

    tokio::fs::create_dir_all(&today_root).await?;

    let Some(newest) = newest_mtime(&today_root).await? else {
        return Ok(RotationOutcome::NoPriorData);
    };

    if is_from_today(newest) {
        return Ok(RotationOutcome::AlreadyCurrent);
    }

    if tokio::fs::try_exists(&previous_root).await? {
        tokio::fs::remove_dir_all(&previous_root).await?;
    }
    tokio::fs::rename(&today_root, &previous_root).await?;
    tokio::fs::create_dir_all(&today_root).await?;
    info!("rotated raw/today -> raw/previous");

    Ok(RotationOutcome::Rotated)
}

/// Recursively finds the newest mtime among files under `dir` (venue pages
/// live a level below `raw/today`, so a shallow scan would only see the
/// venue directories' own mtimes, not their contents').
fn newest_mtime(dir: &Path) -> BoxFuture<'_, Result<Option<SystemTime>>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut newest: Option<SystemTime> = None;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            let mtime = if meta.is_dir() {
                newest_mtime(&entry.path()).await?
            } else {
                Some(meta.modified()?)
            };
            if let Some(mtime) = mtime {
                newest = Some(newest.map_or(mtime, |n: SystemTime| n.max(mtime)));
            }
        }
        Ok(newest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn no_prior_data_when_today_empty() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        assert_eq!(rotate(&root).await.unwrap(), RotationOutcome::NoPriorData);
    }

    #[tokio::test]
    async fn already_current_when_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        let venue_dir = root.raw_today_venue_dir("v1");
        tokio::fs::create_dir_all(&venue_dir).await.unwrap();
        tokio::fs::write(venue_dir.join("metadata.json"), "{}").await.unwrap();

        assert_eq!(rotate(&root).await.unwrap(), RotationOutcome::AlreadyCurrent);
    }

    #[tokio::test]
    async fn rotates_stale_today_into_previous() {
        let dir = tempfile::tempdir().unwrap();
        let root = DataRoot::new(dir.path());
        let venue_dir = root.raw_today_venue_dir("v1");
        tokio::fs::create_dir_all(&venue_dir).await.unwrap();
        let file = venue_dir.join("metadata.json");
        tokio::fs::write(&file, "{}").await.unwrap();

        let yesterday = std::time::SystemTime::now() - Duration::from_secs(60 * 60 * 48);
        let yesterday_ft = filetime::FileTime::from_system_time(yesterday);
        filetime::set_file_mtime(&file, yesterday_ft).unwrap();

        assert_eq!(rotate(&root).await.unwrap(), RotationOutcome::Rotated);
        assert!(root.raw_previous_venue_dir("v1").join("metadata.json").exists());
        assert!(!venue_dir.exists());
    }
}
