pub mod commands;
pub mod handlers;

pub use commands::CliArgs;
pub use handlers::{handle_analyze, handle_print_sample_config};
