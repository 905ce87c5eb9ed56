use std::collections::HashSet;
use std::sync::Arc;

use logtint_types::{ClassifiedLine, Tag};

use crate::buffer::LineBuffer;
use crate::classifier::LineClassifier;
use crate::rules::SeverityRuleSet;
use crate::tags::TagExtractor;
use crate::visibility::SharedVisibility;

/// One open log document.
///
/// Owns the classifier (and so the sticky severity state) of exactly this
/// document; two documents never share classification state.
pub struct LogDocument {
    classifier: LineClassifier,
    buffer: LineBuffer,
    visibility: SharedVisibility,

    /// When set, tags discovered later are only visible if listed here
    tag_allowlist: Option<HashSet<Tag>>,
}

impl LogDocument {
    pub fn new(
        rules: Arc<SeverityRuleSet>,
        tags: Option<TagExtractor>,
        visibility: SharedVisibility,
        capacity: usize,
    ) -> Self {
        Self {
            classifier: LineClassifier::new(rules).with_tags(tags),
            buffer: LineBuffer::new(capacity),
            visibility,
            tag_allowlist: None,
        }
    }

    /// Classify one line, register its tag and store it
    pub fn ingest(&mut self, line: &str) -> ClassifiedLine {
        let classified = self.classifier.classify(line);

        if let Some(tag) = &classified.tag {
            if !self.visibility.has_tag(tag) {
                let visible = self
                    .tag_allowlist
                    .as_ref()
                    .is_none_or(|allowed| allowed.contains(tag));
                self.visibility.update(|v| {
                    v.add_tag(tag.clone());
                    v.set_tag_visible(tag.clone(), visible);
                });
            }
        }

        self.buffer.push(classified.clone());
        classified
    }

    /// Ingest every line of a block of text
    pub fn ingest_text(&mut self, text: &str) -> usize {
        let mut count = 0;
        for line in text.lines() {
            self.ingest(line);
            count += 1;
        }
        count
    }

    /// Start over: fresh classifier state and empty buffer, then ingest `text`
    pub fn reload(&mut self, text: &str) -> usize {
        self.reset();
        self.ingest_text(text)
    }

    /// Forget all lines and the classifier state
    pub fn reset(&mut self) {
        tracing::debug!(lines = self.classifier.line_count(), "resetting document");
        self.classifier.reset();
        self.buffer.clear();
    }

    /// Show only these tags, including ones not discovered yet.
    ///
    /// Tags are matched case-insensitively. Returns the names that are not
    /// registered yet; they take effect when first seen.
    pub fn restrict_tags<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<String> {
        let allowed: HashSet<Tag> = names.iter().map(|n| Tag::new(n.as_ref())).collect();

        let pending = self.visibility.update(|v| {
            let pending: Vec<String> = allowed
                .iter()
                .filter(|tag| !v.has_tag((*tag).clone()))
                .map(|tag| tag.to_string())
                .collect();
            let known: Vec<&str> = allowed
                .iter()
                .filter(|tag| v.has_tag((*tag).clone()))
                .map(|tag| tag.as_str())
                .collect();
            v.set_visible_tags(&known);
            pending
        });

        self.tag_allowlist = Some(allowed);
        pending
    }

    /// Lines to display, filtered against one consistent visibility snapshot
    pub fn visible_lines(&self) -> Vec<ClassifiedLine> {
        let snapshot = self.visibility.snapshot();
        self.buffer.visible(&snapshot)
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn visibility(&self) -> &SharedVisibility {
        &self.visibility
    }

    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }
}
