//! Canned MCP prompts that steer a client toward the analysis tools

use rmcp::model::{
    GetPromptResult, JsonObject, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
};
use rmcp::ErrorData as McpError;

pub const ANALYZE_PROMPT: &str = "analyze-dockerfile";
pub const REVIEW_CHANGES_PROMPT: &str = "review-dockerfile-changes";

fn required_argument(name: &str, description: &str) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(true),
    }
}

pub fn prompt_catalog() -> Vec<Prompt> {
    vec![
        Prompt::new(
            ANALYZE_PROMPT,
            Some("Analyze a Dockerfile for security and best practices"),
            Some(vec![required_argument(
                "dockerfile_path",
                "Path to the Dockerfile to analyze",
            )]),
        ),
        Prompt::new(
            REVIEW_CHANGES_PROMPT,
            Some("Review changes between original and corrected Dockerfile"),
            Some(vec![
                required_argument("original_path", "Path to the original Dockerfile"),
                required_argument("corrected_name", "Name of the corrected Dockerfile file"),
            ]),
        ),
    ]
}

/// String value of a required argument; blank counts as missing
fn argument<'a>(arguments: Option<&'a JsonObject>, name: &str) -> Result<&'a str, McpError> {
    arguments
        .and_then(|args| args.get(name))
        .and_then(|value| value.as_str())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| McpError::invalid_params(format!("{} argument is required", name), None))
}

/// Renders a prompt by name
pub fn render_prompt(name: &str, arguments: Option<&JsonObject>) -> Result<GetPromptResult, McpError> {
    match name {
        ANALYZE_PROMPT => {
            let path = argument(arguments, "dockerfile_path")?;
            Ok(GetPromptResult {
                description: Some("Analyze this Dockerfile for security and best practices".to_string()),
                messages: vec![PromptMessage::new_text(
                    PromptMessageRole::User,
                    format!(
                        "Please analyze the Dockerfile at {} for:\n\
                        1. Security vulnerabilities and best practices\n\
                        2. Optimization opportunities (image size, build time)\n\
                        3. Docker best practices compliance\n\
                        4. Potential runtime issues\n\n\
                        Use the analyze_dockerfile tool to perform the analysis.",
                        path
                    ),
                )],
            })
        }
        REVIEW_CHANGES_PROMPT => {
            let original = argument(arguments, "original_path")?;
            let corrected = argument(arguments, "corrected_name")?;
            Ok(GetPromptResult {
                description: Some("Review changes between original and corrected Dockerfile".to_string()),
                messages: vec![PromptMessage::new_text(
                    PromptMessageRole::User,
                    format!(
                        "Please review the changes between:\n\
                        - Original: {}\n\
                        - Corrected: {}\n\n\
                        Use the get_analysis tool to retrieve the corrected Dockerfile, \
                        then compare it with the original to highlight key improvements.",
                        original, corrected
                    ),
                )],
            })
        }
        other => Err(McpError::invalid_params(
            format!("Unknown prompt: {}", other),
            None,
        )),
    }
}
