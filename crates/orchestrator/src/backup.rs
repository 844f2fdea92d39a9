//! Snapshots the relational store before each run and prunes old
//! snapshots (spec §4.10 "Backup: ... retain last N").

use spotcast_datafs::DataRoot;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{OrchestratorError, Result};

/// Shells out to `pg_dump`, writing the dump to `data/backups/<run_date>.sql`.
pub async fn snapshot(data_root: &DataRoot, database_url: &str, run_date: &str) -> Result<()> {
    let path = data_root.backup_path(run_date);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let output = Command::new("pg_dump")
        .arg(database_url)
        .arg("--file")
        .arg(&path)
        .output()
        .await
        .map_err(|e| OrchestratorError::Backup(format!("failed to spawn pg_dump: {e}")))?;

    if !output.status.success() {
        return Err(OrchestratorError::Backup(String::from_utf8_lossy(&output.stderr).to_string()));
    }

    info!(path = %path.display(), "orchestrator: backup written");
    Ok(())
}

/// Keeps only the `retain` most recently modified `*.sql` files under
/// `backups/`, deleting the rest.
pub async fn prune(data_root: &DataRoot, retain: usize) -> Result<usize> {
    let dir = data_root.backup_dir();
    if !tokio::fs::try_exists(&dir).await? {
        return Ok(0);
    }

    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("sql") {
            continue;
        }
        let modified = entry.metadata().await?.modified()?;
        entries.push((modified, path));
    }
    entries.sort_by_key(|(modified, _)| std::cmp::Reverse(*modified));

    let mut removed = 0;
    for (_, path) in entries.into_iter().skip(retain) {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "orchestrator: failed to prune old backup");
        } else {
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[tokio::test]
    async fn prune_keeps_only_the_newest_n_backups() {
        let tmp = tempfile_dir();
        let data_root = DataRoot::new(&tmp);
        tokio::fs::create_dir_all(data_root.backup_dir()).await.unwrap();

        for (i, age_secs) in [(1, 30), (2, 20), (3, 10)] {
            let path = data_root.backup_dir().join(format!("2026010{i}.sql"));
            tokio::fs::write(&path, b"-- dump").await.unwrap();
            let mtime = SystemTime::now() - Duration::from_secs(age_secs);
            filetime_set(&path, mtime);
        }

        let removed = prune(&data_root, 2).await.unwrap();
        assert_eq!(removed, 1);

        let mut remaining = Vec::new();
        let mut read_dir = tokio::fs::read_dir(data_root.backup_dir()).await.unwrap();
        while let Some(entry) = read_dir.next_entry().await.unwrap() {
            remaining.push(entry.file_name().to_string_lossy().to_string());
        }
        remaining.sort();
        assert_eq!(remaining, vec!["20260102.sql", "20260103.sql"]);
    }

    fn tempfile_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("spotcast-backup-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn filetime_set(path: &std::path::Path, time: SystemTime) {
        let file = std::fs::File::open(path).unwrap();
        file.set_modified(time).unwrap();
    }
}
