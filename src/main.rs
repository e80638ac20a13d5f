//! phrasescan - Search server logs and archives for phrases
//!
//! Main entry point for the command-line tool.
//!
//! # Execution Flow
//!
//! 1. Parse command-line flags
//! 2. Initialize logging (stderr, plus rotating files with `--log-dir`)
//! 3. Resolve the configuration: defaults, then `phrasescan.yaml` (or `--config`),
//!    then `PHRASESCAN_*` environment variables, then flags
//! 4. Validate once; any error is reported and the process exits non-zero
//!    before a single file is opened
//! 5. Print the resolved configuration the scanner will run with

use anyhow::Result;
use phrasescan::{APP_NAME, Cli, ConfigManager, VERSION};

fn main() -> Result<()> {
    let cli = Cli::try_parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());

    if cli.print_defaults {
        print!("{}", ConfigManager::defaults_yaml()?);
        return Ok(());
    }

    let _guard = phrasescan::logging::setup_logging(cli.log_dir.as_deref(), cli.verbose)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let manager = ConfigManager::new(cli.config.as_deref());
    // Returning the error lets anyhow report it once and exit non-zero.
    let config = manager.resolve(cli.overlay())?;

    println!("{}", config.summary());

    Ok(())
}
