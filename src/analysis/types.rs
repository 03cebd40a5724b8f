use crate::inference::GenerationParams;
use serde::{Deserialize, Serialize};

/// Everything needed to run one analysis; built once, consumed once
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Raw Dockerfile text
    pub dockerfile: String,
    /// Prompt template version (e.g. "advanced")
    pub prompt_version: String,
    /// Model identifier passed to the inference endpoint
    pub model: String,
    pub params: GenerationParams,
}

/// Outcome of one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Review text preceding the corrected Dockerfile
    pub narrative: String,
    /// Corrected Dockerfile; always starts with `FROM` when present
    pub corrected_dockerfile: Option<String>,
}

impl AnalysisResult {
    pub fn has_corrected_dockerfile(&self) -> bool {
        self.corrected_dockerfile.is_some()
    }
}
