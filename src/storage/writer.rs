use crate::analysis::AnalysisResult;
use crate::error::AnalyzerError;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Subdirectory holding narrative reports
pub const ANALYSIS_DIR: &str = "analysis";
/// Subdirectory holding corrected Dockerfiles
pub const DOCKERFILES_DIR: &str = "dockerfiles";

pub const ANALYSIS_SUFFIX: &str = "_analysis.md";
pub const CORRECTED_SUFFIX: &str = "_corrected.Dockerfile";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const FALLBACK_BASE_NAME: &str = "Dockerfile";

/// Files produced by one successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub analysis: PathBuf,
    pub corrected: Option<PathBuf>,
}

impl SavedArtifacts {
    pub fn paths(&self) -> Vec<&Path> {
        let mut paths = vec![self.analysis.as_path()];
        if let Some(corrected) = &self.corrected {
            paths.push(corrected.as_path());
        }
        paths
    }
}

/// Persists analysis results under an output root
///
/// Two files per save at most: the narrative in `analysis/` and, when the
/// response carried one, the corrected Dockerfile in `dockerfiles/`. Names
/// carry a one-second timestamp, so two saves of the same input in the same
/// second overwrite each other. A save that fails leaves the earlier files as
/// they were.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn analysis_dir(&self) -> PathBuf {
        self.root.join(ANALYSIS_DIR)
    }

    pub fn dockerfiles_dir(&self) -> PathBuf {
        self.root.join(DOCKERFILES_DIR)
    }

    /// Creates both output directories; safe to call repeatedly
    pub fn ensure_dirs(&self) -> Result<(PathBuf, PathBuf), AnalyzerError> {
        let analysis_dir = self.analysis_dir();
        let dockerfiles_dir = self.dockerfiles_dir();
        for dir in [&analysis_dir, &dockerfiles_dir] {
            fs::create_dir_all(dir).map_err(|source| AnalyzerError::WriteFailed {
                path: dir.clone(),
                source,
            })?;
        }
        Ok((analysis_dir, dockerfiles_dir))
    }

    pub fn save(
        &self,
        result: &AnalysisResult,
        base_name: &str,
    ) -> Result<SavedArtifacts, AnalyzerError> {
        self.save_at(result, base_name, Local::now())
    }

    /// Saves with an explicit timestamp
    pub fn save_at(
        &self,
        result: &AnalysisResult,
        base_name: &str,
        at: DateTime<Local>,
    ) -> Result<SavedArtifacts, AnalyzerError> {
        let (analysis_dir, dockerfiles_dir) = self.ensure_dirs()?;
        let stamp = at.format(TIMESTAMP_FORMAT).to_string();
        let base = sanitize_base_name(base_name);

        let mut planned = vec![(
            analysis_dir.join(format!("{}_{}{}", base, stamp, ANALYSIS_SUFFIX)),
            result.narrative.as_str(),
        )];
        if let Some(corrected) = &result.corrected_dockerfile {
            planned.push((
                dockerfiles_dir.join(format!("{}_{}{}", base, stamp, CORRECTED_SUFFIX)),
                corrected.as_str(),
            ));
        }

        write_all_or_nothing(&planned)?;

        let saved = SavedArtifacts {
            analysis: planned[0].0.clone(),
            corrected: planned.get(1).map(|(path, _)| path.clone()),
        };
        for path in saved.paths() {
            info!("Saved {}", path.display());
        }
        Ok(saved)
    }
}

/// Base name used in artifact file names: the input's file name
pub fn base_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
}

fn sanitize_base_name(base: &str) -> String {
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn hidden_sibling(path: &Path, extension: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}", name, extension))
}

/// Stages every file as a temporary sibling, then renames into place.
/// Files being replaced are moved aside first. On failure every staged or
/// renamed file is removed and the moved-aside files are put back.
fn write_all_or_nothing(files: &[(PathBuf, &str)]) -> Result<(), AnalyzerError> {
    let mut staged: Vec<PathBuf> = Vec::new();
    for (path, content) in files {
        let temp = hidden_sibling(path, "tmp");
        if let Err(source) = fs::write(&temp, content) {
            remove_quietly(&staged);
            remove_quietly(&[temp]);
            return Err(AnalyzerError::WriteFailed {
                path: path.clone(),
                source,
            });
        }
        staged.push(temp);
    }

    let mut placed: Vec<PathBuf> = Vec::new();
    let mut displaced: Vec<(PathBuf, PathBuf)> = Vec::new();
    for ((path, content), temp) in files.iter().zip(&staged) {
        let renamed = displace_existing(path).and_then(|backup| {
            displaced.extend(backup.map(|backup| (backup, path.clone())));
            fs::rename(temp, path)
        });
        if let Err(source) = renamed {
            warn!("Rolling back partial save after failure on {}", path.display());
            remove_quietly(&staged);
            remove_quietly(&placed);
            restore_displaced(&displaced);
            return Err(AnalyzerError::WriteFailed {
                path: path.clone(),
                source,
            });
        }
        debug!("Wrote {} bytes to {}", content.len(), path.display());
        placed.push(path.clone());
    }

    let backups: Vec<PathBuf> = displaced.into_iter().map(|(backup, _)| backup).collect();
    remove_quietly(&backups);
    Ok(())
}

/// Moves an existing file at `path` to a hidden sibling, returning where it went
fn displace_existing(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let backup = hidden_sibling(path, "bak");
    fs::rename(path, &backup)?;
    debug!("Moved existing {} aside", path.display());
    Ok(Some(backup))
}

fn restore_displaced(displaced: &[(PathBuf, PathBuf)]) {
    for (backup, path) in displaced {
        if let Err(e) = fs::rename(backup, path) {
            warn!("Failed to restore {}: {}", path.display(), e);
        }
    }
}

fn remove_quietly(paths: &[PathBuf]) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}
