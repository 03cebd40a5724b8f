use crate::analysis::{ChunkSink, NullSink};
use crate::cli::commands::CliArgs;
use crate::config::{sample_yaml, AnalyzerConfig};
use crate::display::{
    pacing_delay, render_copy_output, render_header, render_missing_dockerfile, render_notice,
    render_saved, stdout_is_terminal, waiting_spinner, Typewriter,
};
use crate::error::AnalyzerError;
use crate::inference::OllamaClient;
use crate::service::{AnalysisOutcome, AnalysisService, AnalyzeOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Exit code for a run cancelled with Ctrl-C
pub const EXIT_INTERRUPTED: i32 = 130;

pub fn handle_print_sample_config() -> i32 {
    print!("{}", sample_yaml());
    0
}

pub async fn handle_analyze(args: &CliArgs, config: AnalyzerConfig) -> i32 {
    let Some(dockerfile) = args.dockerfile.as_deref() else {
        eprintln!("Error: no Dockerfile path given");
        return 2;
    };
    info!("Analyzing {}", dockerfile.display());

    let client = match OllamaClient::new(config.ollama.base_url(), config.ollama.timeout()) {
        Ok(client) => client,
        Err(e) => return report_failure(&e.into()),
    };
    preflight(&client, &config.ollama.model).await;

    let copy_mode = config.output.copy_mode;
    let quiet = args.quiet;
    let delay = pacing_delay(config.output.typewriter_speed, stdout_is_terminal());
    let service = AnalysisService::new(Arc::new(client), config);
    let options = AnalyzeOptions::default();
    debug!(
        "Using {} backend, saving under {}",
        service.backend_name(),
        service.output_root().display()
    );

    let spinner = waiting_spinner(format!(
        "Waiting for {} ...",
        service.model_for(&options)
    ));

    let mut sink: Box<dyn ChunkSink> = if copy_mode {
        Box::new(NullSink)
    } else {
        if !quiet {
            let mut stdout = io::stdout();
            if let Err(e) = render_header(&mut stdout, dockerfile, service.model_for(&options)) {
                debug!("Header not shown: {}", e);
            }
        }
        Box::new(Typewriter::new(io::stdout(), delay).with_spinner(spinner.clone()))
    };

    let outcome = tokio::select! {
        result = service.analyze_file(dockerfile, &options, sink.as_mut()) => result,
        _ = tokio::signal::ctrl_c() => Err(AnalyzerError::Interrupted),
    };
    spinner.finish_and_clear();
    drop(sink);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(AnalyzerError::Interrupted) => {
            warn!("Analysis interrupted; nothing was saved");
            eprintln!("\nInterrupted");
            return EXIT_INTERRUPTED;
        }
        Err(e) => return report_failure(&e),
    };

    if let Err(e) = present(&outcome, copy_mode, quiet) {
        debug!("Output not fully shown: {}", e);
    }

    if let Some(target) = args.output.as_deref() {
        if let Err(code) = write_corrected(&outcome, target) {
            return code;
        }
    }

    0
}

async fn preflight(client: &OllamaClient, model: &str) {
    match client.has_model(model).await {
        Ok(true) => debug!("Model {} is available", model),
        Ok(false) => warn!(
            "Model '{}' is not listed by Ollama; try 'ollama pull {}'",
            model, model
        ),
        // The analysis itself reports an unreachable endpoint with a hint
        Err(e) => debug!("Model check skipped: {}", e),
    }
}

fn present(outcome: &AnalysisOutcome, copy_mode: bool, quiet: bool) -> io::Result<()> {
    let mut stdout = io::stdout();
    if copy_mode {
        if !render_copy_output(&mut stdout, &outcome.result)? {
            let mut stderr = io::stderr();
            render_missing_dockerfile(&mut stderr)?;
        }
        return stdout.flush();
    }

    if !outcome.result.has_corrected_dockerfile() {
        render_missing_dockerfile(&mut stdout)?;
    }
    if quiet {
        return stdout.flush();
    }
    if let Some(saved) = &outcome.saved {
        render_saved(&mut stdout, saved)?;
    }
    render_notice(&mut stdout)?;
    stdout.flush()
}

fn write_corrected(outcome: &AnalysisOutcome, target: &Path) -> Result<(), i32> {
    let Some(dockerfile) = outcome.result.corrected_dockerfile.as_deref() else {
        warn!(
            "No corrected Dockerfile to write to {}",
            target.display()
        );
        return Ok(());
    };
    match std::fs::write(target, format!("{}\n", dockerfile)) {
        Ok(()) => {
            info!("Corrected Dockerfile written to {}", target.display());
            Ok(())
        }
        Err(source) => Err(report_failure(&AnalyzerError::WriteFailed {
            path: target.to_path_buf(),
            source,
        })),
    }
}

fn report_failure(e: &AnalyzerError) -> i32 {
    error!("Analysis failed: {}", e);
    eprintln!("Error: {}", e);
    let help = e.help_message();
    if !help.is_empty() {
        eprintln!("{}", help);
    }
    1
}
