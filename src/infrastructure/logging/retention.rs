//! Retention of rolled log files.
//!
//! `tracing-appender` rolls files but never deletes them; old ones are
//! pruned here on startup.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;

use super::logger::LOG_FILE_NAME;

/// Delete rolled log files last modified more than `retention_days` ago.
///
/// Returns how many files were removed.
pub async fn prune_expired_logs(log_dir: impl AsRef<Path>, retention_days: u32) -> Result<usize> {
    let log_dir = log_dir.as_ref();
    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
    let mut deleted = 0;

    let mut entries = tokio::fs::read_dir(log_dir)
        .await
        .context("failed to read log directory")?;

    while let Some(entry) = entries.next_entry().await.context("failed to read directory entry")? {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_NAME));
        if !is_log {
            continue;
        }

        let modified: DateTime<Utc> = entry
            .metadata()
            .await
            .and_then(|m| m.modified())
            .context("failed to get file modification time")?
            .into();

        if modified < cutoff {
            tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to delete {}", path.display()))?;
            tracing::debug!(path = %path.display(), "deleted expired log file");
            deleted += 1;
        }
    }

    if deleted > 0 {
        tracing::info!(count = deleted, "pruned expired log files");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_zero_retention_prunes_only_log_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nudge.log.2024-03-01"), b"old").unwrap();
        std::fs::write(dir.path().join("nudge.log"), b"current").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let deleted = prune_expired_logs(dir.path(), 0).await.unwrap();

        assert_eq!(deleted, 2);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_recent_files_are_kept() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("nudge.log.2024-03-01"), b"fresh").unwrap();

        assert_eq!(prune_expired_logs(dir.path(), 30).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert_eq!(prune_expired_logs(dir.path().join("absent"), 30).await.unwrap(), 0);
    }
}
