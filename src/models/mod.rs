//! Data models for phrasescan.
//!
//! - [`ScanConfig`]: the flat configuration record, its default factory and its validator
//! - [`OutputFormat`]: the typed result format (`json` or `text`)
//! - [`ConfigError`]: why a configuration was rejected
//! - [`OPTION_TABLE`]: short flags and help text for every option, consumed by the CLI
//!
//! # Lifecycle
//!
//! A [`ScanConfig`] is created once per run from defaults, overlaid with
//! file/environment/flag values, then validated exactly once. After
//! validation it is only read, so it can be shared across scan workers.

pub mod error;
pub mod scan_config;

pub use error::{ConfigError, PathIssue};
pub use scan_config::{
    DEFAULT_ARCHIVE_REGEX, DEFAULT_FILE_REGEX, DEFAULT_SEARCH_DIR, OPTION_TABLE, OptionSpec,
    OutputFormat, ScanConfig, default_concurrency,
};
