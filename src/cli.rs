//! Command-line flags.
//!
//! Option flags mirror [`OPTION_TABLE`]: the derive below declares them, and the
//! table supplies their help text so the flags, config keys and environment
//! variables are described from one place.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};

use crate::config::{ConfigOverlay, ENV_PREFIX};
use crate::models::OPTION_TABLE;

/// Search server logs and archives for phrases.
#[derive(Parser, Debug)]
#[command(name = "phrasescan", author, version, about)]
pub struct Cli {
    #[arg(short = 'p', long)]
    pub phrase_regex: Option<String>,

    #[arg(short = 'd', long)]
    pub search_dir: Option<Utf8PathBuf>,

    #[arg(short = 'f', long)]
    pub file_regex: Option<String>,

    #[arg(short = 'D', long)]
    pub deduplicate: bool,

    #[arg(short = 'e', long)]
    pub extended: bool,

    #[arg(short = 'i', long)]
    pub ips_only: bool,

    #[arg(short = 'o', long)]
    pub output: Option<String>,

    #[arg(short = 'a', long)]
    pub archive_regex: Option<String>,

    #[arg(short = 'A', long)]
    pub include_archives: bool,

    #[arg(short = 't', long, allow_negative_numbers = true)]
    pub concurrency: Option<i64>,

    /// Path to a YAML config file (default: ./phrasescan.yaml if present).
    #[arg(short = 'c', long, env = "PHRASESCAN_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Also write logs to daily-rotated files in this directory.
    #[arg(long)]
    pub log_dir: Option<Utf8PathBuf>,

    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the default configuration as YAML and exit.
    #[arg(long)]
    pub print_defaults: bool,
}

impl Cli {
    /// Clap command with help text taken from [`OPTION_TABLE`].
    pub fn command_with_help() -> clap::Command {
        OPTION_TABLE
            .iter()
            .fold(Self::command(), |cmd, spec| {
                cmd.mut_arg(spec.name, |arg| arg.help(spec.description))
            })
            .after_help(environment_help())
    }

    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command_with_help().try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Option values given on the command line.
    ///
    /// Boolean flags can only switch a feature on; leaving one out keeps the
    /// value from the config file or environment.
    pub fn overlay(&self) -> ConfigOverlay {
        ConfigOverlay {
            phrase_regex: self.phrase_regex.clone(),
            search_dir: self.search_dir.clone(),
            file_regex: self.file_regex.clone(),
            deduplicate: self.deduplicate.then_some(true),
            extended: self.extended.then_some(true),
            ips_only: self.ips_only.then_some(true),
            output: self.output.clone(),
            archive_regex: self.archive_regex.clone(),
            include_archives: self.include_archives.then_some(true),
            concurrency: self.concurrency,
        }
    }
}

fn environment_help() -> String {
    let mut help = String::from("Config file keys and environment variables:\n");
    for spec in OPTION_TABLE {
        help.push_str(&format!(
            "  {:<18} {}_{}\n",
            spec.name,
            ENV_PREFIX,
            spec.name.to_uppercase()
        ));
    }
    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command_with_help().debug_assert();
    }

    #[test]
    fn test_shorts_match_option_table() {
        let cmd = Cli::command_with_help();
        for spec in OPTION_TABLE {
            let arg = cmd
                .get_arguments()
                .find(|a| a.get_id() == spec.name)
                .unwrap_or_else(|| panic!("missing flag for {}", spec.name));
            assert_eq!(arg.get_short(), Some(spec.short), "short for {}", spec.name);
        }
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_args([
            "phrasescan", "-p", "kill", "-d", "/var/log", "-o", "JSON", "-e", "-A", "-t", "4",
        ])
        .unwrap();

        let overlay = cli.overlay();
        assert_eq!(overlay.phrase_regex.as_deref(), Some("kill"));
        assert_eq!(overlay.search_dir, Some(Utf8PathBuf::from("/var/log")));
        assert_eq!(overlay.output.as_deref(), Some("JSON"));
        assert_eq!(overlay.extended, Some(true));
        assert_eq!(overlay.include_archives, Some(true));
        assert_eq!(overlay.concurrency, Some(4));
        assert_eq!(overlay.ips_only, None);
        assert_eq!(overlay.deduplicate, None);
    }

    #[test]
    fn test_negative_concurrency_reaches_validation() {
        let cli = Cli::try_parse_args(["phrasescan", "-t", "-2"]).unwrap();
        assert_eq!(cli.concurrency, Some(-2));
    }

    #[test]
    fn test_no_flags_gives_empty_overlay() {
        let cli = Cli::try_parse_args(["phrasescan"]).unwrap();
        assert!(cli.overlay().is_empty());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_help_lists_environment_variables() {
        let help = environment_help();
        assert!(help.contains("PHRASESCAN_PHRASE_REGEX"));
        assert!(help.contains("PHRASESCAN_INCLUDE_ARCHIVES"));
    }
}
