//! `dockerfile-ai://` resource addressing for saved artifacts

use crate::error::AnalyzerError;
use crate::storage::{validate_file_name, ArtifactKind};

pub const SCHEME: &str = "dockerfile-ai://";

fn segment(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Analysis => "analysis",
        ArtifactKind::Dockerfile => "dockerfile",
    }
}

pub fn resource_uri(kind: ArtifactKind, name: &str) -> String {
    format!("{}{}/{}", SCHEME, segment(kind), name)
}

/// Human-readable resource title
pub fn resource_title(kind: ArtifactKind, name: &str) -> String {
    match kind {
        ArtifactKind::Analysis => format!("Analysis: {}", name),
        ArtifactKind::Dockerfile => format!("Corrected: {}", name),
    }
}

/// Splits a resource URI into kind and file name
///
/// The name goes through the same guard as `get_analysis`, so a URI can never
/// address anything outside the managed directories.
pub fn parse_resource_uri(uri: &str) -> Result<(ArtifactKind, String), AnalyzerError> {
    let unknown = || AnalyzerError::NotFound(uri.to_string());
    let rest = uri.strip_prefix(SCHEME).ok_or_else(unknown)?;
    let (kind_segment, name) = rest.split_once('/').ok_or_else(unknown)?;
    let kind = match kind_segment {
        "analysis" => ArtifactKind::Analysis,
        "dockerfile" => ArtifactKind::Dockerfile,
        _ => return Err(unknown()),
    };
    validate_file_name(name)?;
    Ok((kind, name.to_string()))
}
