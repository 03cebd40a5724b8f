use dockerfile_ai::cli::{handle_analyze, handle_print_sample_config, CliArgs};
use dockerfile_ai::config::AnalyzerConfig;
use dockerfile_ai::util::{init_logging, LoggingConfig};
use dockerfile_ai::VERSION;

use clap::Parser;
use std::process;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.print_sample_config {
        process::exit(handle_print_sample_config());
    }

    let config = match AnalyzerConfig::load(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    init_logging(LoggingConfig::from_settings(&config.logging));

    debug!("dockerfile-ai v{} starting", VERSION);
    debug!("Arguments: {:?}", args);
    debug!("{}", config);

    let exit_code = handle_analyze(&args, config).await;

    process::exit(exit_code);
}
