use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;

use logtint_types::{Classification, ClassifiedLine, Severity};

use crate::visibility::VisibilitySettings;

pub const DEFAULT_CAPACITY: usize = 10_000;

/// Thread-safe ring buffer of classified lines
#[derive(Clone)]
pub struct LineBuffer {
    /// Internal storage
    lines: Arc<RwLock<VecDeque<ClassifiedLine>>>,

    /// Maximum capacity
    capacity: usize,
}

impl LineBuffer {
    /// Create a new buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)))),
            capacity,
        }
    }

    /// Push a new line, evicting the oldest if at capacity
    pub fn push(&self, line: ClassifiedLine) {
        let mut lines = self.lines.write();
        if lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Get all lines (cloned for rendering)
    pub fn all(&self) -> Vec<ClassifiedLine> {
        self.lines.read().iter().cloned().collect()
    }

    /// Get lines filtered by a predicate
    pub fn filtered<F>(&self, predicate: F) -> Vec<ClassifiedLine>
    where
        F: Fn(&ClassifiedLine) -> bool,
    {
        self.lines
            .read()
            .iter()
            .filter(|l| predicate(l))
            .cloned()
            .collect()
    }

    /// Lines visible under the given settings, in order
    pub fn visible(&self, visibility: &VisibilitySettings) -> Vec<ClassifiedLine> {
        self.filtered(|l| visibility.is_visible(l))
    }

    /// Line count per classification
    pub fn severity_counts(&self) -> SeverityCounts {
        let lines = self.lines.read();
        let mut counts = SeverityCounts::default();

        for line in lines.iter() {
            match line.classification {
                Classification::Unclassified => counts.unclassified += 1,
                Classification::Severity(severity) => counts.by_severity[severity.index()] += 1,
            }
        }

        counts
    }

    /// Total line count
    pub fn len(&self) -> usize {
        self.lines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Export all lines as raw text
    pub fn export_raw(&self) -> String {
        self.lines
            .read()
            .iter()
            .map(|l| l.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&self) {
        self.lines.write().clear();
    }

    /// Get the last N lines
    pub fn tail(&self, n: usize) -> Vec<ClassifiedLine> {
        let lines = self.lines.read();
        let start = lines.len().saturating_sub(n);
        lines.iter().skip(start).cloned().collect()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Counts per classification
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    /// Indexed by [`Severity::index`]
    pub by_severity: [usize; 5],
    pub unclassified: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        self.by_severity[severity.index()]
    }

    pub fn total(&self) -> usize {
        self.by_severity.iter().sum::<usize>() + self.unclassified
    }
}
