use super::writer::{ANALYSIS_DIR, ANALYSIS_SUFFIX, CORRECTED_SUFFIX, DOCKERFILES_DIR};
use crate::error::AnalyzerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Which managed directory a saved file lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Analysis,
    Dockerfile,
}

impl ArtifactKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Analysis => ANALYSIS_DIR,
            ArtifactKind::Dockerfile => DOCKERFILES_DIR,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::Analysis => ANALYSIS_SUFFIX,
            ArtifactKind::Dockerfile => CORRECTED_SUFFIX,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ArtifactKind::Analysis => "text/markdown",
            ArtifactKind::Dockerfile => "text/plain",
        }
    }
}

/// One entry in a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

/// Saved files grouped by directory, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedListing {
    pub analyses: Vec<SavedFile>,
    pub corrected_dockerfiles: Vec<SavedFile>,
}

/// Content of one saved file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedContent {
    pub name: String,
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub content: String,
}

/// Read-only view over the output root
#[derive(Debug, Clone)]
pub struct ArtifactCatalog {
    root: PathBuf,
}

impl ArtifactCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists both directories; a missing directory is an empty list
    pub fn list_saved(&self) -> Result<SavedListing, AnalyzerError> {
        Ok(SavedListing {
            analyses: self.list_kind(ArtifactKind::Analysis)?,
            corrected_dockerfiles: self.list_kind(ArtifactKind::Dockerfile)?,
        })
    }

    pub fn list_kind(&self, kind: ArtifactKind) -> Result<Vec<SavedFile>, AnalyzerError> {
        let dir = self.root.join(kind.dir_name());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist yet", dir.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(AnalyzerError::ReadFailed { path: dir, source }),
        };

        let mut files = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(kind.suffix()) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| DateTime::<Utc>::from(std::time::UNIX_EPOCH));
            files.push(SavedFile {
                name,
                path: entry.path(),
                size_bytes: metadata.len(),
                modified,
            });
        }

        // Newest first; name breaks ties so the order is stable
        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(files)
    }

    /// Reads a saved file by plain name, searching analyses then Dockerfiles
    pub fn get_saved(&self, name: &str) -> Result<SavedContent, AnalyzerError> {
        validate_file_name(name)?;
        for kind in [ArtifactKind::Analysis, ArtifactKind::Dockerfile] {
            if let Some(found) = self.read_in(kind, name)? {
                return Ok(found);
            }
        }
        Err(AnalyzerError::NotFound(name.to_string()))
    }

    /// Reads a saved file from one specific directory
    pub fn get_in(&self, kind: ArtifactKind, name: &str) -> Result<SavedContent, AnalyzerError> {
        validate_file_name(name)?;
        self.read_in(kind, name)?
            .ok_or_else(|| AnalyzerError::NotFound(name.to_string()))
    }

    fn read_in(&self, kind: ArtifactKind, name: &str) -> Result<Option<SavedContent>, AnalyzerError> {
        let path = self.root.join(kind.dir_name()).join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| AnalyzerError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        Ok(Some(SavedContent {
            name: name.to_string(),
            path,
            kind,
            content,
        }))
    }
}

/// Accepts only a single plain path component
pub fn validate_file_name(name: &str) -> Result<(), AnalyzerError> {
    let invalid = || AnalyzerError::InvalidName(name.to_string());
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(invalid());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}
