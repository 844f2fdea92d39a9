//! The "data root" facade (spec §9): every stage takes this by value so
//! tests can redirect it to a temp directory, instead of leaning on
//! well-known directory names scattered through the codebase.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

mod atomic;
pub use atomic::{atomic_write_bytes, atomic_write_json, read_json};

/// Typed paths into the on-disk medallion hierarchy rooted at `DATA_DIR`.
#[derive(Debug, Clone)]
pub struct DataRoot {
    root: PathBuf,
}

impl DataRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // --- raw/ (owned by the Fetcher) ---

    pub fn raw_today_root(&self) -> PathBuf {
        self.root.join("raw/today")
    }

    pub fn raw_previous_root(&self) -> PathBuf {
        self.root.join("raw/previous")
    }

    pub fn raw_archive_root(&self, run_date: &str) -> PathBuf {
        self.root.join("raw/archive").join(run_date)
    }

    pub fn raw_today_venue_dir(&self, venue_id: &str) -> PathBuf {
        self.raw_today_root().join(venue_id)
    }

    pub fn raw_previous_venue_dir(&self, venue_id: &str) -> PathBuf {
        self.raw_previous_root().join(venue_id)
    }

    pub fn raw_today_page(&self, venue_id: &str, url_hash: &str) -> PathBuf {
        self.raw_today_venue_dir(venue_id).join(format!("{url_hash}.html"))
    }

    pub fn raw_today_metadata(&self, venue_id: &str) -> PathBuf {
        self.raw_today_venue_dir(venue_id).join("metadata.json")
    }

    // --- silver_merged/ (owned by the Merger) ---

    pub fn merged_dir(&self) -> PathBuf {
        self.root.join("silver_merged/all")
    }

    pub fn merged_path(&self, venue_id: &str) -> PathBuf {
        self.merged_dir().join(format!("{venue_id}.json"))
    }

    // --- silver_trimmed/ (owned by the Trimmer) ---

    pub fn trimmed_all_dir(&self) -> PathBuf {
        self.root.join("silver_trimmed/all")
    }

    pub fn trimmed_all_path(&self, venue_id: &str) -> PathBuf {
        self.trimmed_all_dir().join(format!("{venue_id}.json"))
    }

    pub fn trimmed_previous_dir(&self) -> PathBuf {
        self.root.join("silver_trimmed/previous")
    }

    pub fn trimmed_previous_path(&self, venue_id: &str) -> PathBuf {
        self.trimmed_previous_dir().join(format!("{venue_id}.json"))
    }

    pub fn trimmed_incremental_dir(&self) -> PathBuf {
        self.root.join("silver_trimmed/incremental")
    }

    pub fn trimmed_incremental_path(&self, venue_id: &str) -> PathBuf {
        self.trimmed_incremental_dir().join(format!("{venue_id}.json"))
    }

    pub fn delta_summary_path(&self) -> PathBuf {
        self.root.join("silver_trimmed/delta_summary.json")
    }

    // --- gold/ (owned by the Extractor) ---

    pub fn gold_dir(&self) -> PathBuf {
        self.root.join("gold")
    }

    pub fn gold_path(&self, venue_id: &str) -> PathBuf {
        self.gold_dir().join(format!("{venue_id}.json"))
    }

    pub fn gold_bulk_complete_sentinel(&self) -> PathBuf {
        self.gold_dir().join(".bulk-complete")
    }

    // --- config/ ---

    pub fn config_path(&self, name: &str) -> PathBuf {
        self.root.join("config").join(name)
    }

    // --- reporting/ ---

    pub fn reporting_spots_path(&self) -> PathBuf {
        self.root.join("reporting/spots.json")
    }

    /// The orchestrator's run-state manifest (spec §4.10 "writes a
    /// manifest to disk with the run's state").
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    // --- backups/ ---

    pub fn backup_path(&self, run_date: &str) -> PathBuf {
        self.root.join("backups").join(format!("{run_date}.sql"))
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root.join("backups")
    }
}

/// Convenience: write a serde value to `path`, creating parent directories.
pub async fn write_json_ensuring_dir<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    atomic_write_json(path, value).await
}

/// Convenience: read a serde value from `path`, returning `None` if absent.
pub async fn read_json_opt<T: DeserializeOwned>(path: &Path) -> std::io::Result<Option<T>> {
    read_json(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_well_known() {
        let root = DataRoot::new("/data");
        assert_eq!(
            root.raw_today_page("v1", "abc123").to_str().unwrap(),
            "/data/raw/today/v1/abc123.html"
        );
        assert_eq!(
            root.merged_path("v1").to_str().unwrap(),
            "/data/silver_merged/all/v1.json"
        );
        assert_eq!(
            root.gold_bulk_complete_sentinel().to_str().unwrap(),
            "/data/gold/.bulk-complete"
        );
    }
}
