use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fmt;
use std::fs;
use std::str::FromStr;

use super::error::{ConfigError, PathIssue};

/// Directory searched when none is given.
pub const DEFAULT_SEARCH_DIR: &str = ".";

/// Matches plain log files.
pub const DEFAULT_FILE_REGEX: &str = r".*\.log$";

/// Matches the archive formats the scanner knows how to open.
pub const DEFAULT_ARCHIVE_REGEX: &str = r"\.(7z|bz2|gz|tar|xz|zip|zst|lz)$";

/// Output format of the scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    /// Canonical spellings accepted by [`FromStr`], in the order shown to users.
    pub const ALLOWED: &'static [&'static str] = &["json", "text"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    /// Case-insensitive: `"JSON"` and `"Text"` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(ConfigError::InvalidEnumValue {
                field: "output",
                value: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Metadata for one user-facing option.
///
/// `name` is the key used in config files and (upper-cased, prefixed) in
/// environment variables; `short` is the command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub short: char,
    pub description: &'static str,
}

/// Every option a [`ScanConfig`] can be overlaid with.
pub const OPTION_TABLE: &[OptionSpec] = &[
    OptionSpec {
        name: "phrase_regex",
        short: 'p',
        description: "regex to search for that a player said",
    },
    OptionSpec {
        name: "search_dir",
        short: 'd',
        description: "directory to search for files recursively",
    },
    OptionSpec {
        name: "file_regex",
        short: 'f',
        description: "regex to match files in the search dir",
    },
    OptionSpec {
        name: "deduplicate",
        short: 'D',
        description: "deduplicate objects based on all fields",
    },
    OptionSpec {
        name: "extended",
        short: 'e',
        description: "add two additional fields, file and id to the output",
    },
    OptionSpec {
        name: "ips_only",
        short: 'i',
        description: "only print IP addresses",
    },
    OptionSpec {
        name: "output",
        short: 'o',
        description: "output format, one of 'json' or 'text'",
    },
    OptionSpec {
        name: "archive_regex",
        short: 'a',
        description: "regex to match archive files in the search dir",
    },
    OptionSpec {
        name: "include_archives",
        short: 'A',
        description: "search inside archive files",
    },
    OptionSpec {
        name: "concurrency",
        short: 't',
        description: "number of concurrent workers to use",
    },
];

/// Configuration for a single scan run.
///
/// Built with [`ScanConfig::default`], overlaid with user input, then passed
/// once through [`ScanConfig::validate`]. The compiled patterns are only
/// populated by validation; downstream consumers read them through the
/// accessors and never recompile.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub phrase_regex: String,
    pub search_dir: Utf8PathBuf,
    pub file_regex: String,
    pub deduplicate: bool,
    /// Adds the `file` and `id` fields to each result.
    pub extended: bool,
    pub ips_only: bool,
    pub output: String,
    pub archive_regex: String,
    pub include_archives: bool,
    pub concurrency: i64,

    phrase_regexp: Option<Regex>,
    file_regexp: Option<Regex>,
    archive_regexp: Option<Regex>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            phrase_regex: String::new(),
            search_dir: Utf8PathBuf::from(DEFAULT_SEARCH_DIR),
            file_regex: DEFAULT_FILE_REGEX.to_string(),
            deduplicate: false,
            extended: false,
            ips_only: false,
            output: OutputFormat::Text.as_str().to_string(),
            archive_regex: DEFAULT_ARCHIVE_REGEX.to_string(),
            include_archives: false,
            concurrency: default_concurrency(),
            phrase_regexp: None,
            file_regexp: None,
            archive_regexp: None,
        }
    }
}

/// Number of logical CPUs, never less than one.
pub fn default_concurrency() -> i64 {
    i64::try_from(num_cpus::get()).unwrap_or(i64::MAX).max(1)
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every option and derive the compiled patterns.
    ///
    /// Checks run in a fixed order and stop at the first failure, so the
    /// reported error is stable for a given input. On error the config may be
    /// partially updated and must be discarded.
    ///
    /// Order:
    /// 1. phrase regex present and compiles
    /// 2. search dir present, exists and is a directory
    /// 3. file regex present and compiles
    /// 4. output format is `json` or `text` (normalised to lowercase)
    /// 5. `extended` and `ips_only` are not both set
    /// 6. archive regex compiles if archives are included or a pattern is set
    /// 7. concurrency is at least 1
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.phrase_regex.is_empty() {
            return Err(ConfigError::MissingField("phrase regex"));
        }
        self.phrase_regexp = Some(compile("phrase", &self.phrase_regex)?);

        if self.search_dir.as_str().is_empty() {
            return Err(ConfigError::MissingField("search dir"));
        }
        check_search_dir(&self.search_dir)?;

        if self.file_regex.is_empty() {
            return Err(ConfigError::MissingField("file regex"));
        }
        self.file_regexp = Some(compile("file", &self.file_regex)?);

        let format: OutputFormat = self.output.parse()?;
        self.output = format.as_str().to_string();

        if self.extended && self.ips_only {
            return Err(ConfigError::MutuallyExclusiveFlags("extended", "ips-only"));
        }

        // A non-empty pattern enables archive matching even without the flag.
        if self.include_archives || !self.archive_regex.is_empty() {
            self.archive_regexp = Some(compile("archive", &self.archive_regex)?);
        }

        if self.concurrency < 1 {
            return Err(ConfigError::InvalidRange {
                field: "concurrency",
                min: 1,
                value: self.concurrency,
            });
        }

        tracing::debug!(
            "Configuration validated: dir={}, output={}, archives={}, concurrency={}",
            self.search_dir,
            self.output,
            self.archive_scanning_enabled(),
            self.concurrency
        );

        Ok(())
    }

    /// Compiled phrase pattern, set after successful validation.
    pub fn phrase_regexp(&self) -> Option<&Regex> {
        self.phrase_regexp.as_ref()
    }

    /// Compiled file-name pattern, set after successful validation.
    pub fn file_regexp(&self) -> Option<&Regex> {
        self.file_regexp.as_ref()
    }

    /// Compiled archive pattern. `None` means archives are not scanned.
    pub fn archive_regexp(&self) -> Option<&Regex> {
        self.archive_regexp.as_ref()
    }

    pub fn archive_scanning_enabled(&self) -> bool {
        self.archive_regexp.is_some()
    }

    /// Typed output format. Falls back to text for unvalidated input.
    pub fn output_format(&self) -> OutputFormat {
        self.output.parse().unwrap_or(OutputFormat::Text)
    }

    /// Worker count as a `usize`, for sizing the pool.
    pub fn worker_count(&self) -> usize {
        usize::try_from(self.concurrency).unwrap_or(1).max(1)
    }

    /// One-line description of the resolved configuration.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("phrase={}", self.phrase_regex),
            format!("dir={}", self.search_dir),
            format!("files={}", self.file_regex),
        ];

        match &self.archive_regexp {
            Some(re) => parts.push(format!("archives={}", re.as_str())),
            None => parts.push("archives=off".to_string()),
        }

        parts.push(format!("output={}", self.output));
        parts.push(format!("workers={}", self.concurrency));

        if self.deduplicate {
            parts.push("deduplicate".to_string());
        }
        if self.extended {
            parts.push("extended".to_string());
        }
        if self.ips_only {
            parts.push("ips-only".to_string());
        }

        parts.join(", ")
    }
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { field, source })
}

fn check_search_dir(path: &Utf8Path) -> Result<(), ConfigError> {
    let metadata = fs::metadata(path).map_err(|e| ConfigError::InvalidPath {
        path: path.to_path_buf(),
        reason: PathIssue::Inaccessible(e),
    })?;

    if !metadata.is_dir() {
        return Err(ConfigError::InvalidPath {
            path: path.to_path_buf(),
            reason: PathIssue::NotADirectory,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config(dir: &TempDir) -> ScanConfig {
        let mut config = ScanConfig::default();
        config.phrase_regex = "kill".to_string();
        config.search_dir = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        config
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.search_dir, Utf8PathBuf::from("."));
        assert_eq!(config.file_regex, r".*\.log$");
        assert_eq!(config.output, "text");
        assert!(config.phrase_regex.is_empty());
        assert!(!config.deduplicate);
        assert!(!config.include_archives);
        assert!(config.concurrency >= 1);
        assert!(config.phrase_regexp().is_none());
        assert!(config.file_regexp().is_none());
        assert!(config.archive_regexp().is_none());
    }

    #[test]
    fn test_default_archive_regex_matches_known_extensions() {
        let re = Regex::new(DEFAULT_ARCHIVE_REGEX).unwrap();
        for name in [
            "a.7z", "a.bz2", "a.gz", "a.tar", "a.xz", "a.zip", "a.zst", "a.lz",
        ] {
            assert!(re.is_match(name), "{name} should match");
        }
        assert!(!re.is_match("server.log"));
    }

    #[test]
    fn test_output_format_parse_is_case_insensitive() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!(matches!(
            "yaml".parse::<OutputFormat>(),
            Err(ConfigError::InvalidEnumValue { field: "output", .. })
        ));
    }

    #[test]
    fn test_validate_populates_compiled_patterns() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_config(&dir);

        config.validate().unwrap();

        assert_eq!(config.phrase_regexp().unwrap().as_str(), "kill");
        assert_eq!(config.file_regexp().unwrap().as_str(), DEFAULT_FILE_REGEX);
        // The default archive pattern is non-empty, so it is compiled too.
        assert!(config.archive_scanning_enabled());
    }

    #[test]
    fn test_empty_phrase_is_reported_first() {
        let mut config = ScanConfig::default();
        config.search_dir = Utf8PathBuf::new();
        config.output = "bogus".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("phrase regex")));
    }

    #[test]
    fn test_worker_count_floor() {
        let mut config = ScanConfig::default();
        config.concurrency = 8;
        assert_eq!(config.worker_count(), 8);
        config.concurrency = -3;
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn test_summary_reports_disabled_archives() {
        let dir = TempDir::new().unwrap();
        let mut config = valid_config(&dir);
        config.archive_regex.clear();
        config.ips_only = true;
        config.validate().unwrap();

        let summary = config.summary();
        assert!(summary.contains("archives=off"));
        assert!(summary.contains("ips-only"));
        assert!(summary.starts_with("phrase=kill"));
    }

    #[test]
    fn test_option_table_shorts_are_unique() {
        let mut shorts: Vec<char> = OPTION_TABLE.iter().map(|o| o.short).collect();
        shorts.sort_unstable();
        shorts.dedup();
        assert_eq!(shorts.len(), OPTION_TABLE.len());
    }
}
