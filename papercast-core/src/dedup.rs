// Processed-id store: the only cross-run state besides the news log

use crate::error::Result;
use crate::types::PaperId;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub type ProcessedIds = BTreeSet<PaperId>;

/// Line-delimited file of every identifier ever fetched.
///
/// No locking: one process, one invocation at a time.
#[derive(Debug, Clone)]
pub struct ProcessedIdStore {
    path: PathBuf,
}

impl ProcessedIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the id set. A missing file is an empty set.
    pub fn load(&self) -> Result<ProcessedIds> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No processed-id file at {}, starting empty", self.path.display());
                return Ok(ProcessedIds::new());
            }
            Err(e) => return Err(e.into()),
        };

        let ids: ProcessedIds = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PaperId::from)
            .collect();
        debug!("Loaded {} processed ids from {}", ids.len(), self.path.display());
        Ok(ids)
    }

    /// Overwrite the backing file with `ids`, one per line.
    pub fn save(&self, ids: &ProcessedIds) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = ids
            .iter()
            .map(PaperId::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(&self.path, content)?;
        Ok(())
    }
}
