use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

/// AI-powered Dockerfile review using a local Ollama model
#[derive(Parser, Debug)]
#[command(
    name = "dockerfile-ai",
    about = "AI-powered Dockerfile review using a local Ollama model",
    version,
    long_about = "dockerfile-ai sends a Dockerfile to a local Ollama model, streams back a \
                  review of security and best-practice issues, and saves the review together \
                  with a corrected Dockerfile.\n\n\
                  Examples:\n  \
                  dockerfile-ai Dockerfile\n  \
                  dockerfile-ai ./api/Dockerfile --model llama3.1:8b\n  \
                  dockerfile-ai Dockerfile --copy > Dockerfile.fixed\n  \
                  dockerfile-ai Dockerfile -o Dockerfile.fixed --speed 0"
)]
pub struct CliArgs {
    #[arg(
        value_name = "PATH",
        required_unless_present = "print_sample_config",
        help = "Path to the Dockerfile to analyze"
    )]
    pub dockerfile: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Also write the corrected Dockerfile to this file"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        help = "Copy-friendly output: print only the corrected Dockerfile"
    )]
    pub copy: bool,

    #[arg(
        short = 's',
        long,
        value_name = "SECONDS",
        help = "Typewriter delay per character (0 disables pacing)"
    )]
    pub speed: Option<f64>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Ollama model to use (e.g., 'qwen2.5-coder:7b')"
    )]
    pub model: Option<String>,

    #[arg(
        short = 'p',
        long,
        value_name = "VERSION",
        help = "Prompt template version (basic, advanced)"
    )]
    pub prompt: Option<String>,

    #[arg(long, help = "Do not save the analysis or corrected Dockerfile")]
    pub no_save: bool,

    #[arg(long, value_name = "SECONDS", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Configuration file (default: ~/.dockerfileai.yaml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory for saved analyses and corrected Dockerfiles"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long, help = "Print a sample configuration file and exit")]
    pub print_sample_config: bool,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Verbose logging (debug level)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Explicit level wins, then -v, then -q
    pub fn resolved_log_level(&self) -> Option<String> {
        if let Some(level) = &self.log_level {
            Some(level.clone())
        } else if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        }
    }

    /// Settings this invocation overrides
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            timeout_secs: self.timeout,
            output_dir: self.output_dir.clone(),
            save: self.no_save.then_some(false),
            copy_mode: self.copy.then_some(true),
            typewriter_speed: self.speed,
            prompt_version: self.prompt.clone(),
            log_level: self.resolved_log_level(),
        }
    }
}
