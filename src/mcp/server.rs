use super::payload::{analysis_payload, content_payload, error_payload, listing_payload, to_text};
use super::prompts::{prompt_catalog, render_prompt};
use super::resources::{parse_resource_uri, resource_title, resource_uri};
use crate::analysis::NullSink;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::service::{AnalysisService, AnalyzeOptions};
use crate::storage::ArtifactKind;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Content, GetPromptRequestParams, GetPromptResult,
        ListPromptsResult, ListResourcesResult, PaginatedRequestParams, RawResource,
        ReadResourceRequestParams, ReadResourceResult, Resource, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

const INSTRUCTIONS: &str = "Dockerfile AI reviews Dockerfiles with a local Ollama model.\n\
    - analyze_dockerfile: review a Dockerfile and get a corrected version (saved by default)\n\
    - list_analyses: list saved analyses and corrected Dockerfiles, newest first\n\
    - get_analysis: read a saved file by the name list_analyses reports\n\
    Saved files are also exposed as dockerfile-ai:// resources.\n\
    Prompts: analyze-dockerfile, review-dockerfile-changes.";

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct AnalyzeDockerfileRequest {
    /// Path to the Dockerfile to analyze
    dockerfile_path: String,
    /// Ollama model to use (e.g. "qwen2.5-coder:7b"). Defaults to the configured model.
    model: Option<String>,
    /// Whether to save the analysis and corrected Dockerfile. Default: true
    save_results: Option<bool>,
    /// Prompt template version: "basic" or "advanced". Defaults to the configured version.
    prompt: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetAnalysisRequest {
    /// Name of the saved file, exactly as returned by list_analyses
    file_name: String,
}

// --- Server ---

#[derive(Clone)]
pub struct DockerfileAiServer {
    service: Arc<AnalysisService>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DockerfileAiServer {
    pub fn new(service: Arc<AnalysisService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    pub fn from_config(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        Ok(Self::new(Arc::new(AnalysisService::from_config(config)?)))
    }

    #[tool(
        description = "Analyze a Dockerfile with a local Ollama model. Returns {status, original_file, model_used, analysis, corrected_dockerfile, saved_files?}. corrected_dockerfile is null when the model produced none."
    )]
    async fn analyze_dockerfile(
        &self,
        Parameters(req): Parameters<AnalyzeDockerfileRequest>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP analyze_dockerfile: {}", req.dockerfile_path);
        let options = AnalyzeOptions {
            model: req.model,
            prompt_version: req.prompt,
            save: Some(req.save_results.unwrap_or(true)),
        };
        let path = PathBuf::from(&req.dockerfile_path);
        let outcome = self
            .service
            .analyze_file(&path, &options, &mut NullSink)
            .await;
        Ok(respond(outcome.map(|o| analysis_payload(&o))))
    }

    #[tool(
        description = "List saved analyses and corrected Dockerfiles, newest first. Returns {status, output_directory, analyses: [{name, path, size_bytes, modified}], corrected_dockerfiles: [...]}."
    )]
    fn list_analyses(&self) -> Result<CallToolResult, McpError> {
        let listing = self.service.list_saved();
        Ok(respond(
            listing.map(|l| listing_payload(self.service.output_root(), &l)),
        ))
    }

    #[tool(
        description = "Read a saved analysis (.md) or corrected Dockerfile by file name. Returns {status, file_name, file_path, content}. Only plain file names from list_analyses are accepted."
    )]
    fn get_analysis(
        &self,
        Parameters(req): Parameters<GetAnalysisRequest>,
    ) -> Result<CallToolResult, McpError> {
        let saved = self.service.get_saved(&req.file_name);
        Ok(respond(saved.map(|s| content_payload(&s))))
    }

    fn resources(&self) -> Result<Vec<Resource>, AnalyzerError> {
        let catalog = self.service.catalog();
        let mut resources = Vec::new();
        for kind in [ArtifactKind::Analysis, ArtifactKind::Dockerfile] {
            for file in catalog.list_kind(kind)? {
                let mut raw = RawResource::new(resource_uri(kind, &file.name), file.name.clone());
                raw.description = Some(resource_title(kind, &file.name));
                raw.mime_type = Some(kind.mime_type().to_string());
                resources.push(raw.no_annotation());
            }
        }
        Ok(resources)
    }
}

fn respond(result: Result<Value, AnalyzerError>) -> CallToolResult {
    match result {
        Ok(body) => CallToolResult::success(vec![Content::text(to_text(&body))]),
        Err(e) => {
            error!("Tool call failed: {}", e);
            CallToolResult::error(vec![Content::text(to_text(&error_payload(&e)))])
        }
    }
}

fn to_mcp_error(e: AnalyzerError) -> McpError {
    match e {
        AnalyzerError::NotFound(_) => McpError::resource_not_found(e.to_string(), None),
        AnalyzerError::InvalidName(_) => McpError::invalid_params(e.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

#[tool_handler]
impl ServerHandler for DockerfileAiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = self.resources().map_err(to_mcp_error)?;
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let (kind, name) = parse_resource_uri(&request.uri).map_err(to_mcp_error)?;
        let saved = self
            .service
            .catalog()
            .get_in(kind, &name)
            .map_err(to_mcp_error)?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(saved.content, request.uri)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(prompt_catalog()))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        info!("MCP prompt requested: {}", request.name);
        render_prompt(&request.name, request.arguments.as_ref())
    }
}
