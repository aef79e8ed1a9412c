use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque identifier of one paper in the source index (e.g. `2401.00001v1`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(pub String);

impl PaperId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File stem safe to use inside the audio directory.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect()
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaperId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One search result, as produced by the fetch stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub query: String,
    pub id: PaperId,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub published_date: NaiveDate,
}

impl PaperRecord {
    /// Deterministic audio location for this paper under `audio_dir`.
    pub fn audio_path(&self, audio_dir: &Path) -> PathBuf {
        audio_dir.join(format!("{}.mp3", self.id.file_stem()))
    }
}

/// A fetched paper together with its localized rendering. Appended to the
/// news log once and never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedPaperRecord {
    #[serde(flatten)]
    pub paper: PaperRecord,
    pub title_zh: String,
    pub summary_zh: String,
    /// `None` when speech synthesis failed; serialized as `null`.
    pub audio: Option<String>,
    pub timestamp: DateTime<Local>,
}

impl LocalizedPaperRecord {
    pub fn new(
        paper: PaperRecord,
        title_zh: String,
        summary_zh: String,
        audio: Option<&Path>,
    ) -> Self {
        Self {
            paper,
            title_zh,
            summary_zh,
            audio: audio.map(|p| p.to_string_lossy().into_owned()),
            timestamp: Local::now(),
        }
    }
}
