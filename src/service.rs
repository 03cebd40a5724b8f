//! Analysis service
//!
//! The single entry point shared by the CLI and the MCP server: read a
//! Dockerfile, run the streaming analysis, persist the artifacts, and browse
//! what has been saved.
//!
//! # Example
//!
//! ```no_run
//! use dockerfile_ai::analysis::NullSink;
//! use dockerfile_ai::config::{AnalyzerConfig, ConfigOverrides};
//! use dockerfile_ai::service::{AnalysisService, AnalyzeOptions};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalyzerConfig::load(None, &ConfigOverrides::default())?;
//! let service = AnalysisService::from_config(config)?;
//!
//! let outcome = service
//!     .analyze_file(Path::new("Dockerfile"), &AnalyzeOptions::default(), &mut NullSink)
//!     .await?;
//! println!("{}", outcome.result.narrative);
//! # Ok(())
//! # }
//! ```

use crate::analysis::{AnalysisRequest, AnalysisResult, Analyzer, ChunkSink};
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::inference::{GenerationParams, InferenceBackend, OllamaClient};
use crate::prompt::PromptLibrary;
use crate::storage::{
    base_name_for, ArtifactCatalog, ArtifactWriter, SavedArtifacts, SavedContent, SavedListing,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-call settings; `None` falls back to the configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeOptions {
    pub model: Option<String>,
    pub prompt_version: Option<String>,
    pub save: Option<bool>,
}

/// Everything one analysis produced
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub source: PathBuf,
    pub model: String,
    pub result: AnalysisResult,
    /// `None` when saving was disabled
    pub saved: Option<SavedArtifacts>,
}

pub struct AnalysisService {
    analyzer: Analyzer,
    writer: ArtifactWriter,
    catalog: ArtifactCatalog,
    config: AnalyzerConfig,
}

impl AnalysisService {
    /// Builds the service around an Ollama client described by `config`
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let client = OllamaClient::new(config.ollama.base_url(), config.ollama.timeout())?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn new(backend: Arc<dyn InferenceBackend>, config: AnalyzerConfig) -> Self {
        let prompts = match &config.prompt.prompts_dir {
            Some(dir) => PromptLibrary::with_overrides(dir),
            None => PromptLibrary::builtin(),
        };
        let root = config.output.resolved_output_dir();
        Self {
            analyzer: Analyzer::new(backend, prompts),
            writer: ArtifactWriter::new(&root),
            catalog: ArtifactCatalog::new(&root),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn output_root(&self) -> &Path {
        self.writer.root()
    }

    pub fn backend_name(&self) -> &str {
        self.analyzer.backend().name()
    }

    pub fn prompts(&self) -> &PromptLibrary {
        self.analyzer.prompts()
    }

    /// Model an analysis with `options` would use
    pub fn model_for<'a>(&'a self, options: &'a AnalyzeOptions) -> &'a str {
        options
            .model
            .as_deref()
            .unwrap_or(&self.config.ollama.model)
    }

    /// Analyzes the Dockerfile at `path`, streaming chunks into `sink`
    ///
    /// Nothing is written unless the stream completes.
    pub async fn analyze_file(
        &self,
        path: &Path,
        options: &AnalyzeOptions,
        sink: &mut dyn ChunkSink,
    ) -> Result<AnalysisOutcome, AnalyzerError> {
        let dockerfile = read_dockerfile(path)?;
        let model = self.model_for(options).to_string();
        let request = AnalysisRequest {
            dockerfile,
            prompt_version: options
                .prompt_version
                .clone()
                .unwrap_or_else(|| self.config.prompt.version.clone()),
            model: model.clone(),
            params: self.generation_params(),
        };

        let result = self.analyzer.analyze(&request, sink).await?;

        let save = options.save.unwrap_or(self.config.output.save_analysis);
        let saved = if save {
            Some(self.save(&result, &base_name_for(path))?)
        } else {
            debug!("Saving disabled; results not persisted");
            None
        };

        Ok(AnalysisOutcome {
            source: path.to_path_buf(),
            model,
            result,
            saved,
        })
    }

    fn save(&self, result: &AnalysisResult, base: &str) -> Result<SavedArtifacts, AnalyzerError> {
        if self.config.output.save_dockerfile || result.corrected_dockerfile.is_none() {
            return self.writer.save(result, base);
        }
        info!("Corrected Dockerfile saving disabled; writing analysis only");
        let narrative_only = AnalysisResult {
            narrative: result.narrative.clone(),
            corrected_dockerfile: None,
        };
        self.writer.save(&narrative_only, base)
    }

    fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.config.ollama.temperature,
            top_p: self.config.ollama.top_p,
            max_tokens: self.config.ollama.max_tokens,
        }
    }

    pub fn list_saved(&self) -> Result<SavedListing, AnalyzerError> {
        self.catalog.list_saved()
    }

    pub fn get_saved(&self, name: &str) -> Result<SavedContent, AnalyzerError> {
        self.catalog.get_saved(name)
    }

    pub fn catalog(&self) -> &ArtifactCatalog {
        &self.catalog
    }
}

/// Reads a Dockerfile as UTF-8 text
pub fn read_dockerfile(path: &Path) -> Result<String, AnalyzerError> {
    if !path.exists() {
        return Err(AnalyzerError::InputNotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(AnalyzerError::InputUnreadable {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path is a directory"),
        });
    }
    let content = fs::read_to_string(path).map_err(|source| AnalyzerError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        warn!("{} is empty", path.display());
    }
    Ok(content)
}
