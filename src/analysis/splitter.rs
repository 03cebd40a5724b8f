//! Splits a model response into narrative and corrected Dockerfile
//!
//! The corrected Dockerfile is the first fenced code block whose content starts
//! with a `FROM` instruction. Later qualifying blocks are ignored: models tend to
//! echo examples after the real answer.

use super::types::AnalysisResult;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Instruction every corrected Dockerfile must begin with
pub const BASE_IMAGE_DIRECTIVE: &str = "FROM";

fn fenced_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*[\w.+-]*[ \t]*\r?\n(.*?)```").expect("fenced block regex is valid")
    })
}

/// Location of the corrected Dockerfile inside a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockerfileBlock<'a> {
    /// Byte offset where the opening fence starts
    pub start: usize,
    /// Block content, trimmed, fences excluded
    pub content: &'a str,
}

/// True if `content` begins with the base-image directive
pub fn starts_with_base_image(content: &str) -> bool {
    content
        .split_whitespace()
        .next()
        .is_some_and(|token| token.eq_ignore_ascii_case(BASE_IMAGE_DIRECTIVE))
}

/// Finds the first fenced block that holds a Dockerfile
pub fn find_dockerfile_block(text: &str) -> Option<DockerfileBlock<'_>> {
    fenced_block_regex().captures_iter(text).find_map(|captures| {
        let whole = captures.get(0)?;
        let content = captures.get(1)?.as_str().trim();
        if starts_with_base_image(content) {
            Some(DockerfileBlock {
                start: whole.start(),
                content,
            })
        } else {
            debug!(
                "Skipping fenced block at offset {} (does not start with {})",
                whole.start(),
                BASE_IMAGE_DIRECTIVE
            );
            None
        }
    })
}

/// Extracts just the corrected Dockerfile, if any
pub fn extract_dockerfile(text: &str) -> Option<&str> {
    find_dockerfile_block(text).map(|block| block.content)
}

/// Separates narrative from corrected file content
///
/// Without a qualifying block the whole text is the narrative and the
/// corrected content is absent. If nothing precedes the block, the whole
/// response is kept as narrative so it is never empty.
pub fn split_response(text: &str) -> AnalysisResult {
    match find_dockerfile_block(text) {
        Some(block) => {
            let before = text[..block.start].trim_end();
            let narrative = if before.trim().is_empty() {
                text.trim().to_string()
            } else {
                before.to_string()
            };
            AnalysisResult {
                narrative,
                corrected_dockerfile: Some(block.content.to_string()),
            }
        }
        None => {
            warn!("No corrected Dockerfile found in model response");
            AnalysisResult {
                narrative: text.to_string(),
                corrected_dockerfile: None,
            }
        }
    }
}
