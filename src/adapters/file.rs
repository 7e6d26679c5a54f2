//! JSON file repository.
//!
//! Keeps the whole daily state in one JSON document. Writes go to a sibling
//! temp file first and are renamed into place so a crash mid-write never
//! leaves a truncated record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{decode_record, encode_record, DailyState};
use crate::domain::ports::DailyStateRepository;

#[derive(Debug, Clone)]
pub struct JsonFileDailyStateRepository {
    path: PathBuf,
    capacity: usize,
}

impl JsonFileDailyStateRepository {
    /// `capacity` is only used to upgrade legacy records on load.
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DailyStateRepository for JsonFileDailyStateRepository {
    async fn load(&self) -> DomainResult<Option<DailyState>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        decode_record(&contents, self.capacity).map(Some).map_err(|e| {
            DomainError::SerializationError(format!("{}: {e}", self.path.display()))
        })
    }

    async fn save(&self, state: &DailyState) -> DomainResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let record = encode_record(state)?;
        let temp = self.temp_path();
        fs::write(&temp, record).await?;
        fs::rename(&temp, &self.path).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
