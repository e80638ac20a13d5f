use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// Errors produced while validating a [`ScanConfig`](super::ScanConfig).
///
/// Every variant is terminal: the same input always yields the same error and
/// the configuration that produced it must not be handed to the scanner.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field} regex: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("invalid search dir {path}: {reason}")]
    InvalidPath {
        path: Utf8PathBuf,
        #[source]
        reason: PathIssue,
    },

    #[error("invalid {field} format {value:?}: must be one of {allowed:?}")]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("{0} and {1} flags are mutually exclusive")]
    MutuallyExclusiveFlags(&'static str, &'static str),

    #[error("{field} must be at least {min}, got {value}")]
    InvalidRange {
        field: &'static str,
        min: i64,
        value: i64,
    },
}

/// Why the search directory was rejected.
#[derive(Error, Debug)]
pub enum PathIssue {
    #[error("does not exist or is inaccessible: {0}")]
    Inaccessible(#[source] io::Error),

    #[error("not a directory")]
    NotADirectory,
}

impl ConfigError {
    /// Name of the option that failed validation.
    pub fn field(&self) -> &'static str {
        match *self {
            Self::MissingField(name) => name,
            Self::InvalidPattern { field, .. }
            | Self::InvalidEnumValue { field, .. }
            | Self::InvalidRange { field, .. } => field,
            Self::InvalidPath { .. } => "search dir",
            Self::MutuallyExclusiveFlags(first, _) => first,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = ConfigError::MissingField("phrase regex");
        assert_eq!(err.to_string(), "phrase regex is required");

        let err = ConfigError::MutuallyExclusiveFlags("extended", "ips-only");
        assert_eq!(
            err.to_string(),
            "extended and ips-only flags are mutually exclusive"
        );
        assert_eq!(err.field(), "extended");
    }

    #[test]
    fn test_enum_value_message_lists_allowed() {
        let err = ConfigError::InvalidEnumValue {
            field: "output",
            value: "xml".to_string(),
            allowed: &["json", "text"],
        };
        assert_eq!(
            err.to_string(),
            r#"invalid output format "xml": must be one of ["json", "text"]"#
        );
    }

    #[test]
    fn test_not_a_directory_message() {
        let err = ConfigError::InvalidPath {
            path: Utf8PathBuf::from("server.log"),
            reason: PathIssue::NotADirectory,
        };
        assert_eq!(
            err.to_string(),
            "invalid search dir server.log: not a directory"
        );
        assert_eq!(err.field(), "search dir");
    }
}
