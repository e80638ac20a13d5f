// phrasescan - Search server logs and archives for phrases
//
// This is the library crate containing the configuration record, its overlay
// sources and the validation gate every scan goes through.
// The binary crate (main.rs) provides the command-line entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types for convenience
pub use crate::cli::Cli;
pub use crate::config::{ConfigManager, ConfigOverlay};
pub use crate::models::{ConfigError, OutputFormat, PathIssue, ScanConfig};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
