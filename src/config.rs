//! Configuration management for dockerfile-ai
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. YAML file (`~/.dockerfileai.yaml`, or an explicit `--config` path)
//! 3. Environment variables
//! 4. Command-line overrides
//!
//! # Environment Variables
//!
//! - `OLLAMA_HOST`: host name, `host:port`, or full URL - default: "localhost"
//! - `OLLAMA_PORT`: port - default: "11434"
//! - `OLLAMA_MODEL`: model name - default: "qwen2.5-coder:7b"
//! - `OLLAMA_TIMEOUT`: request timeout in seconds - default: "120"
//! - `OLLAMA_TEMPERATURE`: sampling temperature - default: "0.7"
//! - `DOCKERFILE_AI_OUTPUT_DIR`: output root - default: "~/.dockerfile_ai/output"
//! - `DOCKERFILE_AI_SAVE_ANALYSIS`: persist results (true|false) - default: "true"
//! - `DOCKERFILE_AI_COPY_MODE`: print only the corrected Dockerfile - default: "false"
//! - `DOCKERFILE_AI_LOG_LEVEL`: logging level - default: "info"
//! - `DOCKERFILE_AI_LOG_FILE`: also write logs to this file
//! - `DOCKERFILE_AI_PROMPT`: prompt template version - default: "advanced"
//!
//! # Example
//!
//! ```no_run
//! use dockerfile_ai::config::{AnalyzerConfig, ConfigOverrides};
//!
//! let overrides = ConfigOverrides {
//!     model: Some("llama3.1:8b".to_string()),
//!     ..Default::default()
//! };
//! let config = AnalyzerConfig::load(None, &overrides).expect("Invalid configuration");
//! println!("{}", config.ollama.base_url());
//! ```

use crate::util::logging::{is_valid_level, VALID_LEVELS};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 11434;
const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 0.9;
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_TYPEWRITER_SPEED: f64 = 0.001;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_PROMPT_VERSION: &str = "advanced";

/// File name of the per-user config file in the home directory
pub const CONFIG_FILE_NAME: &str = ".dockerfileai.yaml";
const DEFAULT_OUTPUT_SUBDIR: &str = ".dockerfile_ai/output";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid YAML for this schema
    #[error("Invalid config file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub host: String,
    pub port: u16,
    pub model: String,
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl OllamaSettings {
    /// Base URL of the Ollama API
    ///
    /// `host` may be a bare host (`localhost`, `::1`), `host:port`,
    /// `[v6]:port`, or a full URL; the configured port is only appended when
    /// the host carries none. Bare IPv6 addresses are bracketed.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            return host.to_string();
        }
        if host.starts_with('[') {
            return if host.contains("]:") {
                format!("http://{}", host)
            } else {
                format!("http://{}:{}", host, self.port)
            };
        }
        match host.matches(':').count() {
            0 => format!("http://{}:{}", host, self.port),
            1 => format!("http://{}", host),
            _ => format!("http://[{}]:{}", host, self.port),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output root; `None` means `~/.dockerfile_ai/output`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub save_analysis: bool,
    pub save_dockerfile: bool,
    pub copy_mode: bool,
    /// Seconds per character in the typewriter display
    pub typewriter_speed: f64,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_dir: None,
            save_analysis: true,
            save_dockerfile: true,
            copy_mode: false,
            typewriter_speed: DEFAULT_TYPEWRITER_SPEED,
        }
    }
}

impl OutputSettings {
    /// Output root with the default applied
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(default_output_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    pub version: String,
    /// Directory with `<version>.md` template overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            version: DEFAULT_PROMPT_VERSION.to_string(),
            prompts_dir: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub ollama: OllamaSettings,
    pub output: OutputSettings,
    pub logging: LogSettings,
    pub prompt: PromptSettings,
}

/// Values supplied on the command line; `None` leaves the setting alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub save: Option<bool>,
    pub copy_mode: Option<bool>,
    pub typewriter_speed: Option<f64>,
    pub prompt_version: Option<String>,
    pub log_level: Option<String>,
}

impl AnalyzerConfig {
    /// Loads file, environment and overrides, then validates
    ///
    /// An explicit `config_file` must exist; the default per-user file is
    /// optional.
    pub fn load(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        Self::load_with(config_file, overrides, |key| env::var(key).ok())
    }

    /// Same as [`AnalyzerConfig::load`] with a custom environment lookup
    pub fn load_with<F>(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(lookup)?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config file {}", path.display());
        Self::from_yaml(&text).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Applies environment variables through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Some(port) = get("OLLAMA_PORT") {
            self.ollama.port = parse_value("OLLAMA_PORT", &port)?;
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(timeout) = get("OLLAMA_TIMEOUT") {
            self.ollama.timeout_secs = parse_value("OLLAMA_TIMEOUT", &timeout)?;
        }
        if let Some(temperature) = get("OLLAMA_TEMPERATURE") {
            self.ollama.temperature = parse_value("OLLAMA_TEMPERATURE", &temperature)?;
        }
        if let Some(save) = get("DOCKERFILE_AI_SAVE_ANALYSIS") {
            self.output.save_analysis = parse_flag(&save);
        }
        if let Some(copy) = get("DOCKERFILE_AI_COPY_MODE") {
            self.output.copy_mode = parse_flag(&copy);
        }
        if let Some(dir) = get("DOCKERFILE_AI_OUTPUT_DIR") {
            self.output.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = get("DOCKERFILE_AI_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(file) = get("DOCKERFILE_AI_LOG_FILE") {
            self.logging.log_file = Some(PathBuf::from(file));
        }
        if let Some(prompt) = get("DOCKERFILE_AI_PROMPT") {
            self.prompt.version = prompt;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(model) = &overrides.model {
            self.ollama.model = model.clone();
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.ollama.timeout_secs = timeout;
        }
        if let Some(dir) = &overrides.output_dir {
            self.output.output_dir = Some(dir.clone());
        }
        if let Some(save) = overrides.save {
            self.output.save_analysis = save;
        }
        if let Some(copy) = overrides.copy_mode {
            self.output.copy_mode = copy;
        }
        if let Some(speed) = overrides.typewriter_speed {
            self.output.typewriter_speed = speed;
        }
        if let Some(version) = &overrides.prompt_version {
            self.prompt.version = version.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.to_lowercase();
        }
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` naming the first bad setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        let o = &self.ollama;
        if o.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Ollama host cannot be empty".to_string(),
            ));
        }
        if o.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }
        if o.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if o.timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&o.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                o.temperature
            )));
        }
        if !(0.0..=1.0).contains(&o.top_p) {
            return Err(ConfigError::ValidationFailed(format!(
                "top_p must be between 0.0 and 1.0, got {}",
                o.top_p
            )));
        }
        if o.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be at least 1".to_string(),
            ));
        }
        if !self.output.typewriter_speed.is_finite() || self.output.typewriter_speed < 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "Typewriter speed cannot be negative, got {}",
                self.output.typewriter_speed
            )));
        }
        if !is_valid_level(&self.logging.level) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            )));
        }
        if self.prompt.version.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Prompt version cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl fmt::Display for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dockerfile-ai Configuration:")?;
        writeln!(f, "  Endpoint: {}", self.ollama.base_url())?;
        writeln!(f, "  Model: {}", self.ollama.model)?;
        writeln!(f, "  Timeout: {}s", self.ollama.timeout_secs)?;
        writeln!(
            f,
            "  Sampling: temperature={} top_p={} max_tokens={}",
            self.ollama.temperature, self.ollama.top_p, self.ollama.max_tokens
        )?;
        writeln!(
            f,
            "  Output Dir: {}",
            self.output.resolved_output_dir().display()
        )?;
        writeln!(f, "  Save Results: {}", self.output.save_analysis)?;
        writeln!(f, "  Prompt: {}", self.prompt.version)?;
        writeln!(f, "  Log Level: {}", self.logging.level)?;
        Ok(())
    }
}

/// Default per-user config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Default output root
pub fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(env::temp_dir)
        .join(DEFAULT_OUTPUT_SUBDIR)
}

/// Sample configuration file with every default spelled out
pub fn sample_yaml() -> String {
    AnalyzerConfig::default().to_yaml().unwrap_or_default()
}

fn parse_value<T>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::ParseError {
            field: field.to_string(),
            error: format!("'{}': {}", value, e),
        })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
