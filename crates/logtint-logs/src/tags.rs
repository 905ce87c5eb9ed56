use regex::Regex;

use logtint_types::Tag;

use crate::error::ConfigError;

/// Finds the tag of a line using a regex with a single capture group
#[derive(Clone, Debug)]
pub struct TagExtractor {
    regex: Regex,
}

impl TagExtractor {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidTagPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        // captures_len counts the implicit whole-match group
        if regex.captures_len() != 2 {
            return Err(ConfigError::TagPatternGroups {
                pattern: pattern.to_string(),
            });
        }

        Ok(Self { regex })
    }

    /// Build an extractor from optional settings
    pub fn from_pattern(pattern: Option<&str>) -> Result<Option<Self>, ConfigError> {
        pattern.map(Self::new).transpose()
    }

    /// First tag in the line, lower-cased
    pub fn extract(&self, line: &str) -> Option<Tag> {
        let captures = self.regex.captures(line)?;
        let tag = captures.get(1)?.as_str().trim();
        if tag.is_empty() {
            None
        } else {
            Some(Tag::new(tag))
        }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}
