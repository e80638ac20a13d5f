use crate::models::ScanConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "phrasescan.yaml";

/// Prefix for environment overrides, e.g. `PHRASESCAN_PHRASE_REGEX`.
pub const ENV_PREFIX: &str = "PHRASESCAN";

/// A partial set of option values from one source (file, environment, flags).
///
/// Unset fields leave the underlying [`ScanConfig`] untouched. Keys are the
/// `name`s in [`OPTION_TABLE`](crate::models::OPTION_TABLE).
///
/// Environment values are kept as strings until a field asks for a bool or
/// integer, so patterns arrive verbatim. In YAML files, patterns that look
/// like numbers (`1.50`, `007`) must be quoted or the YAML parser rewrites them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phrase_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_dir: Option<Utf8PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplicate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ips_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_archives: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<i64>,
}

impl ConfigOverlay {
    /// Write every set field onto `config`.
    pub fn apply(self, config: &mut ScanConfig) {
        if let Some(v) = self.phrase_regex {
            config.phrase_regex = v;
        }
        if let Some(v) = self.search_dir {
            config.search_dir = v;
        }
        if let Some(v) = self.file_regex {
            config.file_regex = v;
        }
        if let Some(v) = self.deduplicate {
            config.deduplicate = v;
        }
        if let Some(v) = self.extended {
            config.extended = v;
        }
        if let Some(v) = self.ips_only {
            config.ips_only = v;
        }
        if let Some(v) = self.output {
            config.output = v;
        }
        if let Some(v) = self.archive_regex {
            config.archive_regex = v;
        }
        if let Some(v) = self.include_archives {
            config.include_archives = v;
        }
        if let Some(v) = self.concurrency {
            config.concurrency = v;
        }
    }

    /// Combine with a higher-precedence overlay; its set fields win.
    pub fn merge(self, higher: Self) -> Self {
        Self {
            phrase_regex: higher.phrase_regex.or(self.phrase_regex),
            search_dir: higher.search_dir.or(self.search_dir),
            file_regex: higher.file_regex.or(self.file_regex),
            deduplicate: higher.deduplicate.or(self.deduplicate),
            extended: higher.extended.or(self.extended),
            ips_only: higher.ips_only.or(self.ips_only),
            output: higher.output.or(self.output),
            archive_regex: higher.archive_regex.or(self.archive_regex),
            include_archives: higher.include_archives.or(self.include_archives),
            concurrency: higher.concurrency.or(self.concurrency),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&ScanConfig> for ConfigOverlay {
    fn from(config: &ScanConfig) -> Self {
        Self {
            phrase_regex: Some(config.phrase_regex.clone()),
            search_dir: Some(config.search_dir.clone()),
            file_regex: Some(config.file_regex.clone()),
            deduplicate: Some(config.deduplicate),
            extended: Some(config.extended),
            ips_only: Some(config.ips_only),
            output: Some(config.output.clone()),
            archive_regex: Some(config.archive_regex.clone()),
            include_archives: Some(config.include_archives),
            concurrency: Some(config.concurrency),
        }
    }
}

/// Loads option overlays from a YAML config file and the environment.
///
/// Precedence, lowest first: built-in defaults, config file, environment,
/// then whatever overlay the caller passes to [`ConfigManager::resolve`]
/// (normally the command-line flags).
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_file: Utf8PathBuf,
    file_required: bool,
    env_prefix: String,
    env_source: Option<config::Map<String, String>>,
}

impl ConfigManager {
    /// Create a manager reading `config_file`, or [`DEFAULT_CONFIG_FILE`] if `None`.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn new<P: AsRef<Utf8Path>>(config_file: Option<P>) -> Self {
        let (config_file, file_required) = match config_file {
            Some(path) => (path.as_ref().to_path_buf(), true),
            None => (Utf8PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        Self {
            config_file,
            file_required,
            env_prefix: ENV_PREFIX.to_string(),
            env_source: None,
        }
    }

    /// Read environment overrides from `vars` instead of the process environment.
    pub fn with_environment(mut self, vars: config::Map<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    /// Load the file and environment overlays, environment winning.
    pub fn load_overlay(&self) -> Result<ConfigOverlay> {
        if !self.file_required && !self.config_file.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                self.config_file
            );
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::new(self.config_file.as_str(), config::FileFormat::Yaml)
                    .required(self.file_required),
            )
            .add_source(
                config::Environment::with_prefix(&self.env_prefix).source(self.env_source.clone()),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_file))?;

        let overlay: ConfigOverlay = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_file))?;

        tracing::info!("Loaded config overlay from {}", self.config_file);
        Ok(overlay)
    }

    /// Build and validate the configuration for this run.
    ///
    /// `flags` takes precedence over the file and environment. A failed
    /// validation surfaces as a [`ConfigError`](crate::models::ConfigError)
    /// inside the returned error.
    pub fn resolve(&self, flags: ConfigOverlay) -> Result<ScanConfig> {
        let mut config = ScanConfig::default();
        self.load_overlay()?.merge(flags).apply(&mut config);
        config.validate()?;

        tracing::info!("Configuration resolved: {}", config.summary());
        Ok(config)
    }

    /// Default options as YAML, loadable as a config file.
    pub fn defaults_yaml() -> Result<String> {
        serde_yaml_ng::to_string(&ConfigOverlay::from(&ScanConfig::default()))
            .context("Failed to serialize default config to YAML")
    }

    /// Write the default options to `path` as YAML.
    pub fn write_defaults<P: AsRef<Utf8Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml_string = Self::defaults_yaml()?;

        fs::write(path, yaml_string)
            .with_context(|| format!("Failed to write default config: {}", path))?;

        tracing::info!("Saved default config to {}", path);
        Ok(())
    }

    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }
}
