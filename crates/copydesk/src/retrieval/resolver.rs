//! Maps a topic to the newest matching artifact in the outputs directory

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A `.txt` artifact found in the outputs directory
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub file_name: String,
    pub modified: SystemTime,
}

/// Topic-to-file resolver over a single directory (no recursion)
#[derive(Debug, Clone)]
pub struct DocumentResolver {
    dir: PathBuf,
}

impl DocumentResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// All `.txt` artifacts, sorted by file name
    pub fn artifacts(&self) -> Result<Vec<Artifact>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut artifacts = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_text_artifact(entry.path()) {
                continue;
            }

            // The file may be removed between readdir and stat
            let Some(modified) = modified_time(entry.path(), entry.metadata().map_err(Into::into))
            else {
                continue;
            };

            artifacts.push(Artifact {
                path: entry.path().to_path_buf(),
                file_name: entry.file_name().to_string_lossy().into_owned(),
                modified,
            });
        }

        Ok(artifacts)
    }

    /// Newest artifact whose file name contains `topic`, case-insensitively.
    ///
    /// Equal modification times resolve to the lexicographically smallest
    /// file name, so repeated calls over an unchanged directory agree.
    pub fn resolve_latest(&self, topic: &str) -> Result<PathBuf> {
        let needle = topic.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::Validation("topic must not be empty".to_string()));
        }

        let mut best: Option<Artifact> = None;
        for artifact in self.artifacts()? {
            if !artifact.file_name.to_lowercase().contains(&needle) {
                continue;
            }
            // Artifacts arrive name-sorted: only a strictly newer file displaces
            if best.as_ref().map_or(true, |b| artifact.modified > b.modified) {
                best = Some(artifact);
            }
        }

        best.map(|artifact| {
            tracing::debug!("Resolved topic '{}' to {}", topic, artifact.file_name);
            artifact.path
        })
        .ok_or_else(|| {
            Error::not_found(format!(
                "No file found for topic '{}' in {}",
                topic,
                self.dir.display()
            ))
        })
    }
}

fn modified_time(path: &Path, metadata: std::io::Result<std::fs::Metadata>) -> Option<SystemTime> {
    match metadata.and_then(|m| m.modified()) {
        Ok(modified) => Some(modified),
        Err(e) => {
            tracing::warn!("Skipping {}: cannot stat: {}", path.display(), e);
            None
        }
    }
}

fn is_text_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"))
}

/// Recover a topic label from an artifact file name.
///
/// `home_insurance_20240101_0930.txt` becomes `home insurance`.
pub fn topic_from_file_name(file_name: &str) -> String {
    static TIMESTAMP: OnceLock<Option<Regex>> = OnceLock::new();
    let timestamp = TIMESTAMP.get_or_init(|| Regex::new(r"_\d{8}(?:_\d{4,6})?$").ok());

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    let stem = match timestamp {
        Some(re) => re.replace(&stem, "").into_owned(),
        None => stem,
    };

    stem.replace('_', " ").trim().to_string()
}
