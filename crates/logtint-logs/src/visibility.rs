//! Which severities and tags are shown
//!
//! [`VisibilitySettings`] is the per-document mapping the viewer filters
//! against. [`SharedVisibility`] wraps it for the case where settings are
//! changed from one task while another renders; renders work on a
//! [`SharedVisibility::snapshot`] so a single pass never mixes old and new
//! decisions.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use logtint_types::{Classification, ClassifiedLine, Severity, Tag};

use crate::config::{ShowRecord, VisibilityConfig};
use crate::error::UnknownName;

/// Severity and tag visibility flags
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilitySettings {
    /// Indexed by [`Severity::index`]
    severities: [bool; 5],

    /// Lines seen before any severity matched
    unclassified: bool,

    /// Registered tags. Never shrinks; tags are only toggled.
    tags: BTreeMap<Tag, bool>,

    /// Records read from a persisted config, under their canonical names.
    /// Only `show` is ever rewritten; other fields and unknown entries are
    /// written back as they were read.
    persisted: VisibilityConfig,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            severities: [true; 5],
            unclassified: true,
            tags: BTreeMap::new(),
            persisted: VisibilityConfig::default(),
        }
    }
}

impl VisibilitySettings {
    /// All severities visible, no tags
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a classified line should be displayed.
    ///
    /// Unclassified lines have their own flag, shown by default.
    pub fn is_visible(&self, line: &ClassifiedLine) -> bool {
        let severity_visible = match line.classification {
            Classification::Unclassified => self.unclassified,
            Classification::Severity(severity) => self.is_severity_visible(severity),
        };

        severity_visible
            && line
                .tag
                .as_ref()
                .is_none_or(|tag| self.tags.get(tag).copied().unwrap_or(true))
    }

    pub fn is_severity_visible(&self, severity: Severity) -> bool {
        self.severities[severity.index()]
    }

    /// Hide every severity, then show exactly the named ones.
    ///
    /// Names are case-insensitive and accept aliases such as `warn`.
    /// `unclassified` counts as a name too; unless it is given, lines seen
    /// before any severity matched are hidden. Unknown names are skipped and
    /// returned.
    pub fn set_visible_severities<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<UnknownName> {
        let mut unknown = Vec::new();
        let mut visible = Vec::new();
        let mut unclassified = false;
        for name in names {
            let name = name.as_ref();
            if is_unclassified_name(name) {
                unclassified = true;
                continue;
            }
            match Severity::parse(name) {
                Some(severity) => visible.push(severity),
                None => unknown.push(UnknownName::Severity(name.to_string())),
            }
        }

        self.set_visible_severity_set(&visible);
        self.unclassified = unclassified;

        for name in &unknown {
            tracing::warn!("ignoring {}", name);
        }
        unknown
    }

    /// Hide every severity, then show exactly these. The unclassified flag is
    /// left alone.
    pub fn set_visible_severity_set(&mut self, severities: &[Severity]) {
        self.severities = [false; 5];
        for severity in severities {
            self.severities[severity.index()] = true;
        }
    }

    pub fn set_severity_visible(&mut self, severity: Severity, visible: bool) {
        self.severities[severity.index()] = visible;
    }

    /// Show every severity and unclassified lines
    pub fn show_all_severities(&mut self) {
        self.severities = [true; 5];
        self.unclassified = true;
    }

    pub fn is_unclassified_visible(&self) -> bool {
        self.unclassified
    }

    pub fn set_unclassified_visible(&mut self, visible: bool) {
        self.unclassified = visible;
    }

    /// Visible severities in priority order
    pub fn visible_severities(&self) -> Vec<Severity> {
        Severity::ALL
            .into_iter()
            .filter(|s| self.is_severity_visible(*s))
            .collect()
    }

    /// Hide every tag, then show exactly the named ones.
    ///
    /// Case-insensitive. Names that are not registered tags are skipped and
    /// returned.
    pub fn set_visible_tags<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<UnknownName> {
        for visible in self.tags.values_mut() {
            *visible = false;
        }

        let mut unknown = Vec::new();
        for name in names {
            let tag = Tag::new(name.as_ref());
            match self.tags.get_mut(&tag) {
                Some(visible) => *visible = true,
                None => unknown.push(UnknownName::Tag(name.as_ref().to_string())),
            }
        }

        for name in &unknown {
            tracing::warn!("ignoring {}", name);
        }
        unknown
    }

    /// Register a tag as visible. Does nothing if it is already registered.
    pub fn add_tag(&mut self, tag: impl Into<Tag>) -> bool {
        let tag = tag.into();
        if self.tags.contains_key(&tag) {
            return false;
        }
        tracing::debug!(%tag, "new tag");
        self.tags.insert(tag, true);
        true
    }

    pub fn has_tag(&self, tag: impl Into<Tag>) -> bool {
        self.tags.contains_key(&tag.into())
    }

    /// Toggle a registered tag. Returns false if the tag is unknown.
    pub fn set_tag_visible(&mut self, tag: impl Into<Tag>, visible: bool) -> bool {
        match self.tags.get_mut(&tag.into()) {
            Some(flag) => {
                *flag = visible;
                true
            }
            None => false,
        }
    }

    pub fn visible_tags(&self) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(tag, _)| tag)
            .collect()
    }

    pub fn all_tags(&self) -> Vec<&Tag> {
        self.tags.keys().collect()
    }

    /// Build settings from a persisted config, merged over the defaults.
    ///
    /// Known severities take their `show` flag from the config; severities
    /// missing from it stay visible. Every tag in the config is registered
    /// (lower-cased). Entries with unknown severity names, extra fields on
    /// any record and unknown top-level keys are kept so
    /// [`VisibilitySettings::to_config`] writes them back unchanged.
    pub fn from_config(config: &VisibilityConfig) -> Self {
        let mut settings = Self::default();

        for (name, record) in &config.severity {
            let key = if is_unclassified_name(name) {
                settings.unclassified = record.show;
                Classification::UNCLASSIFIED_TOKEN.to_string()
            } else if let Some(severity) = Severity::parse(name) {
                settings.severities[severity.index()] = record.show;
                severity.name().to_string()
            } else {
                tracing::warn!("keeping unknown severity '{}' from visibility settings", name);
                name.clone()
            };
            settings.persisted.severity.insert(key, record.clone());
        }

        for (name, record) in &config.tags {
            let tag = Tag::new(name);
            if tag.as_str().is_empty() {
                continue;
            }
            settings
                .persisted
                .tags
                .insert(tag.as_str().to_string(), record.clone());
            settings.tags.insert(tag, record.show);
        }

        settings.persisted.extra = config.extra.clone();
        settings
    }

    /// Export to the persisted form
    pub fn to_config(&self) -> VisibilityConfig {
        let mut config = self.persisted.clone();

        for severity in Severity::ALL {
            set_show(
                &mut config.severity,
                severity.name(),
                self.is_severity_visible(severity),
            );
        }
        set_show(
            &mut config.severity,
            Classification::UNCLASSIFIED_TOKEN,
            self.unclassified,
        );
        for (tag, visible) in &self.tags {
            set_show(&mut config.tags, tag.as_str(), *visible);
        }

        config
    }
}

fn set_show(records: &mut BTreeMap<String, ShowRecord>, name: &str, show: bool) {
    records
        .entry(name.to_string())
        .or_insert_with(|| ShowRecord::new(show))
        .show = show;
}

fn is_unclassified_name(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(Classification::UNCLASSIFIED_TOKEN)
}

/// Visibility settings shared between the task that edits them and the one
/// that renders
#[derive(Clone, Debug, Default)]
pub struct SharedVisibility {
    inner: Arc<RwLock<VisibilitySettings>>,
}

impl SharedVisibility {
    pub fn new(settings: VisibilitySettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Consistent copy for one filter pass
    pub fn snapshot(&self) -> VisibilitySettings {
        self.inner.read().clone()
    }

    /// Mutate the settings under the write lock
    pub fn update<R>(&self, f: impl FnOnce(&mut VisibilitySettings) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.inner.read().has_tag(tag.clone())
    }

    /// Check one line without cloning the settings
    pub fn is_visible(&self, line: &ClassifiedLine) -> bool {
        self.inner.read().is_visible(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(classification: Classification, tag: Option<&str>) -> ClassifiedLine {
        ClassifiedLine::new(1, "x".to_string(), classification).with_tag(tag.map(Tag::new))
    }

    fn sev(severity: Severity) -> Classification {
        Classification::Severity(severity)
    }

    #[test]
    fn test_defaults_show_everything() {
        let settings = VisibilitySettings::new();
        assert_eq!(settings.visible_severities(), Severity::ALL.to_vec());
        assert!(settings.all_tags().is_empty());
        assert!(settings.is_visible(&line(sev(Severity::Trace), None)));
    }

    #[test]
    fn test_set_visible_severities_replaces_all() {
        let mut settings = VisibilitySettings::new();
        settings.set_visible_severities(&["WARN"]);
        settings.set_visible_severities(&["ERROR"]);

        assert!(!settings.is_visible(&line(sev(Severity::Warning), None)));
        assert!(settings.is_visible(&line(sev(Severity::Error), None)));
        assert_eq!(settings.visible_severities(), vec![Severity::Error]);
    }

    #[test]
    fn test_unknown_severity_names_are_skipped() {
        let mut settings = VisibilitySettings::new();
        let unknown = settings.set_visible_severities(&["info", "fatal", "Error"]);

        assert_eq!(unknown, vec![UnknownName::Severity("fatal".to_string())]);
        assert_eq!(
            settings.visible_severities(),
            vec![Severity::Info, Severity::Error]
        );
    }

    #[test]
    fn test_unclassified_has_its_own_flag() {
        let mut settings = VisibilitySettings::new();
        assert!(settings.is_visible(&line(Classification::Unclassified, None)));

        settings.set_visible_severities(&["info"]);
        assert!(!settings.is_visible(&line(Classification::Unclassified, None)));

        let unknown = settings.set_visible_severities(&["Unclassified", "info"]);
        assert!(unknown.is_empty());
        assert!(settings.is_visible(&line(Classification::Unclassified, None)));
        assert!(!settings.is_visible(&line(sev(Severity::Error), None)));

        settings.set_visible_severity_set(&[Severity::Error]);
        assert!(settings.is_unclassified_visible());

        settings.set_unclassified_visible(false);
        settings.show_all_severities();
        assert!(settings.is_unclassified_visible());
        assert_eq!(settings.visible_severities(), Severity::ALL.to_vec());
    }

    #[test]
    fn test_tag_case_insensitive() {
        let mut settings = VisibilitySettings::new();
        settings.add_tag("Build");
        settings.add_tag("net");
        settings.set_visible_tags(&["build"]);

        assert!(settings.has_tag("BUILD"));
        assert!(settings.is_visible(&line(sev(Severity::Info), Some("build"))));
        assert!(!settings.is_visible(&line(sev(Severity::Info), Some("net"))));
        assert_eq!(settings.visible_tags(), vec![&Tag::new("build")]);
    }

    #[test]
    fn test_tag_and_severity_both_required() {
        let mut settings = VisibilitySettings::new();
        settings.add_tag("build");
        settings.set_visible_severities(&["error"]);

        assert!(!settings.is_visible(&line(sev(Severity::Info), Some("build"))));
        assert!(settings.is_visible(&line(sev(Severity::Error), Some("build"))));

        settings.set_tag_visible("build", false);
        assert!(!settings.is_visible(&line(sev(Severity::Error), Some("build"))));
    }

    #[test]
    fn test_add_tag_is_idempotent() {
        let mut settings = VisibilitySettings::new();
        assert!(settings.add_tag("db"));
        settings.set_tag_visible("db", false);
        assert!(!settings.add_tag("DB"));

        assert_eq!(settings.all_tags().len(), 1);
        assert!(settings.visible_tags().is_empty());
    }

    #[test]
    fn test_unknown_tags_reported() {
        let mut settings = VisibilitySettings::new();
        settings.add_tag("a");
        let unknown = settings.set_visible_tags(&["a", "b"]);
        assert_eq!(unknown, vec![UnknownName::Tag("b".to_string())]);
        assert!(settings.has_tag("a"));
        assert!(!settings.has_tag("b"));
    }

    #[test]
    fn test_config_round_trip_keeps_unknown_entries() {
        let config = VisibilityConfig::from_json_str(
            r#"{
                "severity": {
                    "debug": { "show": false },
                    "unclassified": { "show": false },
                    "fatal": { "show": true }
                },
                "tags": { "Build": { "show": false } },
                "layout": "compact"
            }"#,
        )
        .unwrap();

        let settings = VisibilitySettings::from_config(&config);
        assert!(!settings.is_severity_visible(Severity::Debug));
        assert!(settings.is_severity_visible(Severity::Trace));
        assert!(settings.has_tag("build"));
        assert!(settings.visible_tags().is_empty());
        assert!(!settings.is_unclassified_visible());

        let exported = settings.to_config();
        assert_eq!(exported.severity.len(), 7);
        assert!(!exported.severity["unclassified"].show);
        assert!(exported.severity["fatal"].show);
        assert!(!exported.severity["debug"].show);
        assert!(!exported.tags["build"].show);
        assert_eq!(exported.extra["layout"], serde_json::Value::from("compact"));
    }

    #[test]
    fn test_config_round_trip_keeps_fields_on_known_records() {
        let config = VisibilityConfig::from_json_str(
            r#"{
                "severity": {
                    "trace": { "show": false, "pinned": true },
                    "WARN": { "show": true, "note": "noisy" }
                },
                "tags": { "Build": { "show": true, "color": "red" } }
            }"#,
        )
        .unwrap();

        let mut settings = VisibilitySettings::from_config(&config);
        settings.set_tag_visible("build", false);

        let exported = settings.to_config();
        let trace = &exported.severity["trace"];
        assert!(!trace.show);
        assert_eq!(trace.extra["pinned"], serde_json::Value::from(true));

        let warning = &exported.severity["warning"];
        assert!(warning.show);
        assert_eq!(warning.extra["note"], serde_json::Value::from("noisy"));
        assert!(!exported.severity.contains_key("WARN"));

        let build = &exported.tags["build"];
        assert!(!build.show);
        assert_eq!(build.extra["color"], serde_json::Value::from("red"));
        assert!(exported.severity["info"].extra.is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_updates() {
        let shared = SharedVisibility::default();
        let snapshot = shared.snapshot();

        shared.update(|v| v.set_visible_severities(&["error"]));

        assert!(snapshot.is_severity_visible(Severity::Info));
        assert!(!shared.snapshot().is_severity_visible(Severity::Info));
        assert!(!shared.is_visible(&line(sev(Severity::Info), None)));
        assert!(shared.is_visible(&line(sev(Severity::Error), None)));
    }
}
