//! Utility modules for dockerfile-ai

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
