use std::path::PathBuf;

use thiserror::Error;

use logtint_types::Severity;

/// Errors raised while building the classification setup.
///
/// These surface at startup only; classifying a line never fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid pattern for {severity}: {pattern:?}")]
    InvalidPattern {
        severity: Severity,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("empty pattern for {severity} would match every line")]
    EmptyPattern { severity: Severity },

    #[error("invalid tag pattern {pattern:?}")]
    InvalidTagPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("tag pattern {pattern:?} must contain exactly one capture group")]
    TagPatternGroups { pattern: String },

    #[error("invalid {field} color for {key}: {value:?}")]
    InvalidColor {
        key: String,
        field: &'static str,
        value: String,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse visibility settings")]
    Json(#[from] serde_json::Error),
}

/// A name in a visibility request that did not resolve to a known entry.
///
/// Returned to the caller rather than raised: the rest of the request is
/// still applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnknownName {
    Severity(String),
    Tag(String),
}

impl std::fmt::Display for UnknownName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Severity(name) => write!(f, "unknown severity '{}'", name),
            Self::Tag(name) => write!(f, "unknown tag '{}'", name),
        }
    }
}
