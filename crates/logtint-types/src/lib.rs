//! Shared types for logtint
//!
//! This crate contains the data model passed between the classifier, the
//! visibility filter and the viewers.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Severity
// ============================================================================

/// Log severity, in the order patterns are evaluated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// All severities in priority order. The first one whose pattern matches wins.
    pub const ALL: [Severity; 5] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
    ];

    /// Parse a severity name. Case-insensitive, accepts common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" | "trc" => Some(Self::Trace),
            "debug" | "dbg" => Some(Self::Debug),
            "info" | "inf" | "information" => Some(Self::Info),
            "warning" | "warn" | "wrn" => Some(Self::Warning),
            "error" | "err" => Some(Self::Error),
            _ => None,
        }
    }

    /// Canonical lower-case name, also used as the style key
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Short display string (3 chars)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Trace => "TRC",
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warning => "WRN",
            Self::Error => "ERR",
        }
    }

    /// Position in [`Severity::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Self::Trace => 0,
            Self::Debug => 1,
            Self::Info => 2,
            Self::Warning => 3,
            Self::Error => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Severity assigned to a line, or the marker for lines seen before any match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// No line of the document has matched a severity pattern yet
    #[default]
    Unclassified,
    Severity(Severity),
}

impl Classification {
    pub const UNCLASSIFIED_TOKEN: &'static str = "unclassified";

    /// Style key handed to viewers
    pub fn token(&self) -> &'static str {
        match self {
            Self::Unclassified => Self::UNCLASSIFIED_TOKEN,
            Self::Severity(severity) => severity.name(),
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::Unclassified => None,
            Self::Severity(severity) => Some(*severity),
        }
    }

    /// Short display string (3 chars)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unclassified => "   ",
            Self::Severity(severity) => severity.label(),
        }
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Self::Unclassified)
    }
}

impl From<Severity> for Classification {
    fn from(severity: Severity) -> Self {
        Self::Severity(severity)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ============================================================================
// Tags
// ============================================================================

/// User-defined label attached to lines, independent of severity.
///
/// Tags are case-normalized to lower case when constructed, so `Build` and
/// `build` are the same tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Classified lines
// ============================================================================

/// A raw line together with the classification assigned to it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// 1-based line number within the current document pass
    pub line_number: u64,

    /// Original raw line
    pub raw: String,

    /// Assigned classification
    pub classification: Classification,

    /// Tag found in the line, if tag discovery is enabled
    pub tag: Option<Tag>,
}

impl ClassifiedLine {
    pub fn new(line_number: u64, raw: String, classification: Classification) -> Self {
        Self {
            line_number,
            raw,
            classification,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: Option<Tag>) -> Self {
        self.tag = tag;
        self
    }

    pub fn severity(&self) -> Option<Severity> {
        self.classification.severity()
    }

    /// Style key for this line
    pub fn token(&self) -> &'static str {
        self.classification.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_aliases() {
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warning));
        assert_eq!(Severity::parse("warning"), Some(Severity::Warning));
        assert_eq!(Severity::parse(" Error "), Some(Severity::Error));
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn test_priority_order() {
        let names: Vec<_> = Severity::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["trace", "debug", "info", "warning", "error"]);
        for (i, severity) in Severity::ALL.iter().enumerate() {
            assert_eq!(severity.index(), i);
        }
    }

    #[test]
    fn test_tag_is_lowercased() {
        assert_eq!(Tag::new("Build"), Tag::new("build"));
        assert_eq!(Tag::from("  NET ").as_str(), "net");
    }

    #[test]
    fn test_tokens() {
        assert_eq!(Classification::Unclassified.token(), "unclassified");
        assert_eq!(Classification::from(Severity::Warning).token(), "warning");
    }
}
