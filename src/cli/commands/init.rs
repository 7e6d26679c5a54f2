//! Implementation of the `nudge init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::{database_url, initialize_database};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::StorageBackend;
use crate::infrastructure::config::{ConfigLoader, CONFIG_FILE};
use crate::infrastructure::setup::create_config_file;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing nudge.yaml
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
    pub config_written: bool,
    pub backend: StorageBackend,
    /// Storage file prepared for the configured backend, if any.
    pub storage_path: Option<PathBuf>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("\nWrote {}", self.config_path.display()));
        } else {
            lines.push(format!("\nKept existing {} (use --force to overwrite)", self.config_path.display()));
        }
        match (&self.backend, &self.storage_path) {
            (StorageBackend::Sqlite, Some(path)) => {
                lines.push(format!("Database initialized at {}", path.display()));
            }
            (StorageBackend::File, Some(path)) => {
                lines.push(format!("State will be stored in {}", path.display()));
            }
            _ => lines.push("State is kept in memory only".to_string()),
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?.join(&args.path)
    };
    fs::create_dir_all(&target_path)
        .await
        .with_context(|| format!("Failed to create {}", target_path.display()))?;

    let config_path = target_path.join(CONFIG_FILE);
    let config_written = create_config_file(&config_path, args.force)?;
    let config = ConfigLoader::load_in(&target_path, None)?;

    let storage_path = match config.storage.backend {
        StorageBackend::Sqlite => {
            let db_path = resolve(&target_path, &config.storage.database_path);
            initialize_database(&database_url(&db_path.display().to_string()), None)
                .await
                .context("Failed to initialize database")?;
            Some(db_path)
        }
        StorageBackend::File => {
            let state_path = resolve(&target_path, &config.storage.state_file);
            if let Some(parent) = state_path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            Some(state_path)
        }
        StorageBackend::Memory => None,
    };

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Nudge reinitialized successfully.".to_string()
        } else {
            "Nudge initialized successfully.".to_string()
        },
        config_path,
        config_written,
        backend: config.storage.backend,
        storage_path,
    };

    output(&output_data, json_mode);
    Ok(())
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config_and_database() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs {
            force: false,
            path: dir.path().to_path_buf(),
        };

        execute(args, true).await.unwrap();

        assert!(dir.path().join(CONFIG_FILE).exists());
        assert!(dir.path().join(".nudge/nudge.db").exists());
    }

    #[test]
    fn test_resolve_keeps_absolute_paths() {
        let base = Path::new("/srv/nudge");
        assert_eq!(resolve(base, "state.json"), PathBuf::from("/srv/nudge/state.json"));
        assert_eq!(resolve(base, "/var/lib/nudge.db"), PathBuf::from("/var/lib/nudge.db"));
    }
}
