use std::sync::Arc;

use logtint_types::{Classification, ClassifiedLine};

use crate::rules::SeverityRuleSet;
use crate::tags::TagExtractor;

/// Line-by-line severity state machine.
///
/// A line matching a severity pattern switches the current classification to
/// that severity. A line matching nothing keeps the current one, so stack
/// traces and other continuation lines stay with the entry that started them.
/// Lines before the first match are [`Classification::Unclassified`].
///
/// One classifier belongs to one document; call [`LineClassifier::reset`]
/// before classifying a new one.
#[derive(Clone, Debug)]
pub struct LineClassifier {
    rules: Arc<SeverityRuleSet>,
    tags: Option<TagExtractor>,
    current: Classification,
    line_count: u64,
}

impl LineClassifier {
    pub fn new(rules: Arc<SeverityRuleSet>) -> Self {
        Self {
            rules,
            tags: None,
            current: Classification::Unclassified,
            line_count: 0,
        }
    }

    /// Attach a tag extractor; every emitted line carries the tag found in it
    pub fn with_tags(mut self, tags: Option<TagExtractor>) -> Self {
        self.tags = tags;
        self
    }

    /// Classify the next line of the document
    pub fn classify(&mut self, line: &str) -> ClassifiedLine {
        self.advance(line);
        let tag = self.tags.as_ref().and_then(|t| t.extract(line));
        ClassifiedLine::new(self.line_count, line.to_string(), self.current).with_tag(tag)
    }

    /// Classify a sequence of lines, in order
    pub fn classify_all<'a, I>(&mut self, lines: I) -> Vec<ClassifiedLine>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().map(|line| self.classify(line)).collect()
    }

    /// Advance the state with the next line and return only its style key
    pub fn token(&mut self, line: &str) -> &'static str {
        self.advance(line);
        self.current.token()
    }

    /// Classification that the next unmatched line would inherit
    pub fn current(&self) -> Classification {
        self.current
    }

    /// Lines consumed since the last reset
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    /// Forget all state, ready for a new document
    pub fn reset(&mut self) {
        self.current = Classification::Unclassified;
        self.line_count = 0;
    }

    pub fn rules(&self) -> &SeverityRuleSet {
        &self.rules
    }

    fn advance(&mut self, line: &str) {
        self.line_count += 1;
        if let Some(severity) = self.rules.matches(line) {
            if self.current != Classification::Severity(severity) {
                tracing::trace!(line = self.line_count, %severity, "severity changed");
            }
            self.current = Classification::Severity(severity);
        }
    }
}
