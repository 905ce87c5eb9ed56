use regex::Regex;

use logtint_types::Severity;

use crate::config::SeveritySettings;
use crate::error::ConfigError;

/// Compiled severity patterns, checked in [`Severity::ALL`] order
#[derive(Clone)]
pub struct SeverityRuleSet {
    rules: Vec<(Severity, Regex)>,
}

impl SeverityRuleSet {
    /// Compile the pattern of every severity.
    ///
    /// A pattern is a regex fragment searched anywhere in the line; a plain
    /// word like `WARN` is a valid pattern.
    pub fn new(settings: &SeveritySettings) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(Severity::ALL.len());

        for severity in Severity::ALL {
            let pattern = &settings.style(severity).pattern;
            if pattern.is_empty() {
                return Err(ConfigError::EmptyPattern { severity });
            }
            let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                severity,
                pattern: pattern.clone(),
                source,
            })?;
            rules.push((severity, regex));
        }

        Ok(Self { rules })
    }

    /// First severity whose pattern occurs in the line
    pub fn matches(&self, line: &str) -> Option<Severity> {
        self.rules
            .iter()
            .find(|(_, regex)| regex.is_match(line))
            .map(|(severity, _)| *severity)
    }

    /// Source text of a severity's pattern
    pub fn pattern(&self, severity: Severity) -> &str {
        self.rules
            .iter()
            .find(|(s, _)| *s == severity)
            .map(|(_, regex)| regex.as_str())
            .unwrap_or_default()
    }
}

impl Default for SeverityRuleSet {
    fn default() -> Self {
        Self::new(&SeveritySettings::default()).unwrap()
    }
}

impl std::fmt::Debug for SeverityRuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|(s, r)| (s, r.as_str())))
            .finish()
    }
}
