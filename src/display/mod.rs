//! Terminal presentation: streaming display, banners, and saved-file summary

pub mod typewriter;

pub use typewriter::Typewriter;

use crate::analysis::AnalysisResult;
use crate::storage::SavedArtifacts;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const RULE: &str = "============================================================";

pub fn stdout_is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn stderr_is_terminal() -> bool {
    atty::is(atty::Stream::Stderr)
}

/// Per-character delay; pacing only makes sense on a terminal
pub fn pacing_delay(seconds_per_char: f64, interactive: bool) -> Duration {
    if !interactive || !seconds_per_char.is_finite() || seconds_per_char <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(seconds_per_char)
}

/// Spinner on stderr while waiting for the first chunk; hidden off-terminal
pub fn waiting_spinner(message: impl Into<String>) -> ProgressBar {
    if !stderr_is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn render_header(out: &mut impl Write, dockerfile: &Path, model: &str) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Dockerfile AI Analysis")?;
    writeln!(out, "  File:  {}", dockerfile.display())?;
    writeln!(out, "  Model: {}", model)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)
}

pub fn render_notice(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(
        out,
        "Note: this analysis is AI-generated. Review the suggestions and test the"
    )?;
    writeln!(out, "corrected Dockerfile before using it in production.")?;
    writeln!(out, "{}", RULE)
}

pub fn render_missing_dockerfile(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "Warning: no corrected Dockerfile found in the response; only the analysis is available."
    )
}

pub fn render_saved(out: &mut impl Write, saved: &SavedArtifacts) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Saved files:")?;
    writeln!(out, "  Analysis:   {}", saved.analysis.display())?;
    if let Some(corrected) = &saved.corrected {
        writeln!(out, "  Dockerfile: {}", corrected.display())?;
    }
    Ok(())
}

/// Copy-friendly output: the corrected Dockerfile and nothing else
///
/// Returns `false` when there is nothing to print.
pub fn render_copy_output(out: &mut impl Write, result: &AnalysisResult) -> io::Result<bool> {
    match &result.corrected_dockerfile {
        Some(dockerfile) => {
            writeln!(out, "{}", dockerfile)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_pacing_delay() {
        assert_eq!(pacing_delay(0.001, true), Duration::from_millis(1));
        assert_eq!(pacing_delay(0.001, false), Duration::ZERO);
        assert_eq!(pacing_delay(0.0, true), Duration::ZERO);
        assert_eq!(pacing_delay(f64::NAN, true), Duration::ZERO);
    }

    #[test]
    fn test_header_names_file_and_model() {
        let text = render(|out| render_header(out, Path::new("app/Dockerfile"), "qwen2.5-coder:7b"));
        assert!(text.contains("app/Dockerfile"));
        assert!(text.contains("qwen2.5-coder:7b"));
    }

    #[test]
    fn test_notice_mentions_review() {
        let text = render(|out| render_notice(out));
        assert!(text.contains("AI-generated"));
    }

    #[test]
    fn test_saved_lists_only_existing_artifacts() {
        let saved = SavedArtifacts {
            analysis: PathBuf::from("/out/analysis/x_analysis.md"),
            corrected: None,
        };
        let text = render(|out| render_saved(out, &saved));
        assert!(text.contains("/out/analysis/x_analysis.md"));
        assert!(!text.contains("Dockerfile:"));
    }

    #[test]
    fn test_copy_output_prints_only_dockerfile() {
        let result = AnalysisResult {
            narrative: "Long review".to_string(),
            corrected_dockerfile: Some("FROM alpine:3.19".to_string()),
        };
        let mut buf = Vec::new();
        assert!(render_copy_output(&mut buf, &result).unwrap());
        assert_eq!(String::from_utf8(buf).unwrap(), "FROM alpine:3.19\n");

        let empty = AnalysisResult {
            narrative: "Nothing".to_string(),
            corrected_dockerfile: None,
        };
        let mut buf = Vec::new();
        assert!(!render_copy_output(&mut buf, &empty).unwrap());
        assert!(buf.is_empty());
    }
}
