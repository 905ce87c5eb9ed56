//! Log classification for logtint
//!
//! This crate provides the severity rules, the line classifier, visibility
//! filtering, line buffering and line sources.

mod buffer;
mod classifier;
pub mod config;
mod document;
mod error;
mod rules;
mod source;
mod tags;
mod visibility;

pub use buffer::{DEFAULT_CAPACITY, LineBuffer, SeverityCounts};
pub use classifier::LineClassifier;
pub use config::{SeverityStyleSettings, SeveritySettings, VisibilityConfig};
pub use document::LogDocument;
pub use error::{ConfigError, UnknownName};
pub use rules::SeverityRuleSet;
pub use source::{LineSource, SourceEvent, SourceReader};
pub use tags::TagExtractor;
pub use visibility::{SharedVisibility, VisibilitySettings};

// Re-export types used in our public API
pub use logtint_types::{Classification, ClassifiedLine, Severity, Tag};
