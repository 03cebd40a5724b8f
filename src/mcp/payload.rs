//! JSON bodies returned by the MCP tools

use crate::error::AnalyzerError;
use crate::service::AnalysisOutcome;
use crate::storage::{SavedContent, SavedFile, SavedListing};
use serde_json::{json, Value};
use std::path::Path;

pub fn analysis_payload(outcome: &AnalysisOutcome) -> Value {
    let mut body = json!({
        "status": "success",
        "original_file": outcome.source.display().to_string(),
        "model_used": outcome.model,
        "analysis": outcome.result.narrative,
        "corrected_dockerfile": outcome.result.corrected_dockerfile,
    });
    if let Some(saved) = &outcome.saved {
        let mut files = json!({ "analysis": saved.analysis.display().to_string() });
        if let Some(corrected) = &saved.corrected {
            files["dockerfile"] = json!(corrected.display().to_string());
        }
        body["saved_files"] = files;
    }
    body
}

pub fn listing_payload(root: &Path, listing: &SavedListing) -> Value {
    json!({
        "status": "success",
        "output_directory": root.display().to_string(),
        "analyses": listing.analyses.iter().map(file_entry).collect::<Vec<_>>(),
        "corrected_dockerfiles": listing
            .corrected_dockerfiles
            .iter()
            .map(file_entry)
            .collect::<Vec<_>>(),
    })
}

fn file_entry(file: &SavedFile) -> Value {
    json!({
        "name": file.name,
        "path": file.path.display().to_string(),
        "size_bytes": file.size_bytes,
        "modified": file.modified.to_rfc3339(),
    })
}

pub fn content_payload(saved: &SavedContent) -> Value {
    json!({
        "status": "success",
        "file_name": saved.name,
        "file_path": saved.path.display().to_string(),
        "content": saved.content,
    })
}

pub fn error_payload(error: &AnalyzerError) -> Value {
    json!({
        "status": "error",
        "kind": error.kind(),
        "error": error.to_string(),
    })
}

pub fn to_text(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Serialization error: {}", e))
}
