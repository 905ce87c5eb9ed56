//! Settings consumed by the classifier and the viewers
//!
//! Severity settings live in a TOML file (`<config_dir>/logtint/settings.toml`
//! unless overridden). Visibility settings are a JSON document so they can be
//! persisted next to the log file the user is looking at.
//!
//! Both are merged over defaults field by field: a value present in the file
//! replaces the default of the same field, anything missing keeps its default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use logtint_types::Severity;

use crate::error::ConfigError;

pub const DEFAULT_FONT_SIZE: u32 = 15;

/// Colors and match pattern of one severity
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeverityStyleSettings {
    pub text_color: String,
    pub background_color: String,
    pub pattern: String,
}

impl SeverityStyleSettings {
    fn new(text_color: &str, background_color: &str, pattern: &str) -> Self {
        Self {
            text_color: text_color.to_string(),
            background_color: background_color.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// Default colors and pattern for a severity
    pub fn default_for(severity: Severity) -> Self {
        match severity {
            Severity::Trace => Self::new("#3B1051", "rgba(235, 206, 254, 0.9)", "TRACE"),
            Severity::Debug => Self::new("#132554", "rgba(203, 217, 254, 0.9)", "DEBUG"),
            Severity::Info => Self::new("#093714", "rgba(212, 237, 218, 0.9)", "INFO"),
            Severity::Warning => Self::new("#413207", "rgba(255, 193, 7, 0.9)", "WARN"),
            Severity::Error => Self::new("#64171E", "rgba(246, 115, 115, 0.9)", "ERROR"),
        }
    }
}

/// Tag discovery settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TagSettings {
    /// Regex with exactly one capture group; the captured text is the tag
    pub pattern: Option<String>,
}

/// Severity settings with defaults applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeveritySettings {
    /// Kept for the persisted format; the terminal viewer ignores it
    pub font_size: u32,
    pub trace: SeverityStyleSettings,
    pub debug: SeverityStyleSettings,
    pub info: SeverityStyleSettings,
    pub warning: SeverityStyleSettings,
    pub error: SeverityStyleSettings,
    pub tags: TagSettings,
}

impl Default for SeveritySettings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            trace: SeverityStyleSettings::default_for(Severity::Trace),
            debug: SeverityStyleSettings::default_for(Severity::Debug),
            info: SeverityStyleSettings::default_for(Severity::Info),
            warning: SeverityStyleSettings::default_for(Severity::Warning),
            error: SeverityStyleSettings::default_for(Severity::Error),
            tags: TagSettings::default(),
        }
    }
}

/// Settings as read from disk: every field optional.
///
/// Unknown top-level keys (e.g. a severity this version does not have) are
/// collected and skipped. Unknown keys inside a known table are rejected.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub trace: Option<SeverityStyleFile>,
    #[serde(default)]
    pub debug: Option<SeverityStyleFile>,
    #[serde(default)]
    pub info: Option<SeverityStyleFile>,
    #[serde(default)]
    pub warning: Option<SeverityStyleFile>,
    #[serde(default)]
    pub error: Option<SeverityStyleFile>,
    #[serde(default)]
    pub tags: Option<TagSettingsFile>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityStyleFile {
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagSettingsFile {
    #[serde(default)]
    pub pattern: Option<String>,
}

impl SeveritySettings {
    /// Load settings from `path`, or from the default location if it exists,
    /// falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        if let Some(path) = path {
            let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let file: SettingsFile = toml::from_str(&contents).map_err(|source| {
                ConfigError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;
            settings.merge_with(file);
            tracing::debug!(path = %path.display(), "loaded severity settings");
        }

        Ok(settings)
    }

    /// Parse settings from a TOML string, merged over defaults
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile = toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        let mut settings = Self::default();
        settings.merge_with(file);
        Ok(settings)
    }

    /// `<config_dir>/logtint/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        let config_dir = dirs::config_dir()?;
        Some(config_dir.join("logtint").join("settings.toml"))
    }

    /// Overlay values from a settings file onto these settings.
    ///
    /// Fields present in `other` win; absent fields are left untouched.
    pub fn merge_with(&mut self, other: SettingsFile) {
        for key in other.unknown.keys() {
            tracing::warn!("ignoring unknown settings key '{}'", key);
        }

        if let Some(font_size) = other.font_size {
            self.font_size = font_size;
        }

        let overlays = [
            (Severity::Trace, other.trace),
            (Severity::Debug, other.debug),
            (Severity::Info, other.info),
            (Severity::Warning, other.warning),
            (Severity::Error, other.error),
        ];
        for (severity, overlay) in overlays {
            let Some(overlay) = overlay else {
                continue;
            };
            let style = self.style_mut(severity);
            if let Some(text_color) = overlay.text_color {
                style.text_color = text_color;
            }
            if let Some(background_color) = overlay.background_color {
                style.background_color = background_color;
            }
            if let Some(pattern) = overlay.pattern {
                style.pattern = pattern;
            }
        }

        if let Some(tags) = other.tags {
            if tags.pattern.is_some() {
                self.tags.pattern = tags.pattern;
            }
        }
    }

    pub fn style(&self, severity: Severity) -> &SeverityStyleSettings {
        match severity {
            Severity::Trace => &self.trace,
            Severity::Debug => &self.debug,
            Severity::Info => &self.info,
            Severity::Warning => &self.warning,
            Severity::Error => &self.error,
        }
    }

    pub fn style_mut(&mut self, severity: Severity) -> &mut SeverityStyleSettings {
        match severity {
            Severity::Trace => &mut self.trace,
            Severity::Debug => &mut self.debug,
            Severity::Info => &mut self.info,
            Severity::Warning => &mut self.warning,
            Severity::Error => &mut self.error,
        }
    }
}

// ============================================================================
// Visibility settings (persisted form)
// ============================================================================

/// A `{ "show": bool }` record. Extra fields are carried through unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShowRecord {
    #[serde(default = "default_show")]
    pub show: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_show() -> bool {
    true
}

impl ShowRecord {
    pub fn new(show: bool) -> Self {
        Self {
            show,
            extra: BTreeMap::new(),
        }
    }
}

/// Persisted visibility: severity name → record, tag name → record
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default)]
    pub severity: BTreeMap<String, ShowRecord>,
    #[serde(default)]
    pub tags: BTreeMap<String, ShowRecord>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VisibilityConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_json_string()?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SeveritySettings::default();
        assert_eq!(settings.font_size, 15);
        assert_eq!(settings.warning.pattern, "WARN");
        assert_eq!(settings.error.background_color, "rgba(246, 115, 115, 0.9)");
        assert!(settings.tags.pattern.is_none());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let settings = SeveritySettings::from_toml_str(
            r#"
            font_size = 12

            [warning]
            pattern = "WARNING|WARN"
            "#,
        )
        .unwrap();

        assert_eq!(settings.font_size, 12);
        assert_eq!(settings.warning.pattern, "WARNING|WARN");
        assert_eq!(settings.warning.text_color, "#413207");
        assert_eq!(settings.error, SeverityStyleSettings::default_for(Severity::Error));
    }

    #[test]
    fn test_unknown_tables_skipped() {
        let settings = SeveritySettings::from_toml_str(
            "theme = \"dark\"\n[fatal]\npattern = \"FATAL\"\n[error]\npattern = \"ERR\"\n",
        )
        .unwrap();

        assert_eq!(settings.error.pattern, "ERR");
        assert_eq!(settings.info, SeverityStyleSettings::default_for(Severity::Info));
    }

    #[test]
    fn test_bad_values_rejected() {
        let typo = SeveritySettings::from_toml_str("[error]\npatern = \"ERR\"\n");
        assert!(matches!(typo, Err(ConfigError::Parse { .. })));

        let wrong_type = SeveritySettings::from_toml_str("font_size = \"big\"\n");
        assert!(matches!(wrong_type, Err(ConfigError::Parse { .. })));

        let not_a_table = SeveritySettings::from_toml_str("warning = 3\n");
        assert!(matches!(not_a_table, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[tags]\npattern = '\\[(\\w+)\\]'\n").unwrap();

        let settings = SeveritySettings::load(Some(&path)).unwrap();
        assert_eq!(settings.tags.pattern.as_deref(), Some(r"\[(\w+)\]"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            SeveritySettings::load(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_visibility_config_keeps_extra_fields() {
        let json = r#"{
            "severity": { "trace": { "show": false, "pinned": true } },
            "tags": { "build": {} },
            "version": 3
        }"#;
        let config = VisibilityConfig::from_json_str(json).unwrap();

        assert!(!config.severity["trace"].show);
        assert!(config.tags["build"].show);
        assert_eq!(config.extra["version"], Value::from(3));

        let back = VisibilityConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.severity["trace"].extra["pinned"], Value::Bool(true));
    }
}
