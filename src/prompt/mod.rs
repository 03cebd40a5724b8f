//! Prompt templates for Dockerfile review
//!
//! Templates are plain Markdown with a `{{DOCKERFILE}}` insertion point. Two
//! versions ship with the binary; a prompts directory may add more or replace
//! the built-ins by dropping `<version>.md` files into it.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Marker replaced by the Dockerfile content
pub const INSERTION_MARKER: &str = "{{DOCKERFILE}}";

const BASIC_TEMPLATE: &str = include_str!("templates/basic.md");
const ADVANCED_TEMPLATE: &str = include_str!("templates/advanced.md");

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt template not found: '{version}'. Available: {available}")]
    TemplateNotFound { version: String, available: String },

    #[error("Failed to read prompt template {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PromptError {
    pub fn kind(&self) -> &'static str {
        match self {
            PromptError::TemplateNotFound { .. } => "TemplateNotFound",
            PromptError::Unreadable { .. } => "TemplateUnreadable",
        }
    }
}

/// Built-in template versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptVersion {
    Basic,
    #[default]
    Advanced,
}

impl PromptVersion {
    pub const ALL: [PromptVersion; 2] = [PromptVersion::Basic, PromptVersion::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVersion::Basic => "basic",
            PromptVersion::Advanced => "advanced",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            PromptVersion::Basic => BASIC_TEMPLATE,
            PromptVersion::Advanced => ADVANCED_TEMPLATE,
        }
    }
}

impl fmt::Display for PromptVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptVersion {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "v1" => Ok(PromptVersion::Basic),
            "advanced" | "v2" => Ok(PromptVersion::Advanced),
            _ => Err(not_found(s, &builtin_names())),
        }
    }
}

/// Read-only set of templates, shared by every analysis
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    overrides_dir: Option<PathBuf>,
}

impl PromptLibrary {
    /// Library with only the built-in templates
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Library that looks in `dir` before falling back to the built-ins
    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self {
            overrides_dir: Some(dir.into()),
        }
    }

    /// Returns the template text for `version`
    pub fn template(&self, version: &str) -> Result<Cow<'static, str>, PromptError> {
        if is_valid_version_name(version) {
            if let Some(dir) = &self.overrides_dir {
                let path = dir.join(format!("{}.md", version));
                match fs::read_to_string(&path) {
                    Ok(text) => {
                        debug!("Using prompt template override {}", path.display());
                        return Ok(Cow::Owned(text));
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(source) => return Err(PromptError::Unreadable { path, source }),
                }
            }
        }

        match version.parse::<PromptVersion>() {
            Ok(builtin) => Ok(Cow::Borrowed(builtin.template())),
            Err(_) => Err(not_found(version, &self.available())),
        }
    }

    /// Builds the final prompt for one Dockerfile
    pub fn compose(&self, version: &str, dockerfile: &str) -> Result<String, PromptError> {
        let template = self.template(version)?;
        Ok(compose_prompt(&template, dockerfile))
    }

    /// Names of every template this library can serve
    pub fn available(&self) -> Vec<String> {
        let mut names = builtin_names();
        if let Some(dir) = &self.overrides_dir {
            names.extend(list_override_names(dir));
        }
        names.sort();
        names.dedup();
        names
    }
}

/// Inserts `dockerfile` at the template's insertion point
///
/// Templates without the marker get the content appended after a blank line.
pub fn compose_prompt(template: &str, dockerfile: &str) -> String {
    if template.contains(INSERTION_MARKER) {
        template.replacen(INSERTION_MARKER, dockerfile, 1)
    } else {
        format!("{}\n\n{}", template, dockerfile)
    }
}

fn is_valid_version_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn builtin_names() -> Vec<String> {
    PromptVersion::ALL.iter().map(|v| v.as_str().to_string()).collect()
}

fn list_override_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_string()))
        .filter(|name| is_valid_version_name(name))
        .collect()
}

fn not_found(version: &str, available: &[String]) -> PromptError {
    PromptError::TemplateNotFound {
        version: version.to_string(),
        available: available.join(", "),
    }
}
