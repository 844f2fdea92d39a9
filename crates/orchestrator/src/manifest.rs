//! The on-disk run manifest (spec §4.10 "writes a manifest to disk with
//! the run's state"), kept alongside the `pipeline_runs` row so the
//! `status` CLI command has something to read without a DB round trip.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spotcast_common::{RunStatus, StepRecord};
use spotcast_datafs::DataRoot;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: i64,
    pub run_date: String,
    pub area_filter: Option<String>,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: BTreeMap<String, StepRecord>,
}

pub async fn write(data_root: &DataRoot, manifest: &Manifest) -> Result<()> {
    spotcast_datafs::write_json_ensuring_dir(&data_root.manifest_path(), manifest).await?;
    Ok(())
}

pub async fn read(data_root: &DataRoot) -> Result<Option<Manifest>> {
    Ok(spotcast_datafs::read_json_opt(&data_root.manifest_path()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_reads_back_a_manifest() {
        let dir = std::env::temp_dir().join(format!("spotcast-manifest-test-{}", std::process::id()));
        let data_root = DataRoot::new(&dir);
        let manifest = Manifest {
            run_id: 1,
            run_date: "20260731".to_string(),
            area_filter: None,
            status: RunStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            steps: BTreeMap::new(),
        };
        write(&data_root, &manifest).await.unwrap();
        let read_back = read(&data_root).await.unwrap().unwrap();
        assert_eq!(read_back.run_id, 1);
        assert_eq!(read_back.run_date, "20260731");
    }
}
