use ratatui::style::{Color, Style};
use std::str::FromStr;

use logtint_logs::{ConfigError, SeveritySettings};
use logtint_types::{Classification, Severity};

/// Classification → style lookup handed to viewers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleTable {
    /// Indexed by [`Severity::index`]
    severities: [Style; 5],
    unclassified: Style,
}

impl StyleTable {
    /// Parse the colors of every severity.
    ///
    /// Fails with [`ConfigError::InvalidColor`] on the first color that does
    /// not parse.
    pub fn from_settings(settings: &SeveritySettings) -> Result<Self, ConfigError> {
        let mut severities = [Style::default(); 5];

        for severity in Severity::ALL {
            let style = settings.style(severity);
            let fg = parse_color(&style.text_color).ok_or_else(|| ConfigError::InvalidColor {
                key: severity.name().to_string(),
                field: "text",
                value: style.text_color.clone(),
            })?;
            let bg = parse_color(&style.background_color).ok_or_else(|| {
                ConfigError::InvalidColor {
                    key: severity.name().to_string(),
                    field: "background",
                    value: style.background_color.clone(),
                }
            })?;
            severities[severity.index()] = Style::default().fg(fg).bg(bg);
        }

        Ok(Self {
            severities,
            unclassified: Style::default(),
        })
    }

    pub fn get(&self, classification: Classification) -> Style {
        match classification {
            Classification::Unclassified => self.unclassified,
            Classification::Severity(severity) => self.severities[severity.index()],
        }
    }

    /// Look up by style key, as returned by `LineClassifier::token`
    pub fn by_token(&self, token: &str) -> Option<Style> {
        if token == Classification::UNCLASSIFIED_TOKEN {
            return Some(self.unclassified);
        }
        Severity::parse(token).map(|s| self.severities[s.index()])
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::from_settings(&SeveritySettings::default()).unwrap()
    }
}

/// Parse a color string.
///
/// Accepts `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)` and the color
/// names ratatui understands. The alpha channel is dropped.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();

    if let Some(args) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if s.starts_with("rgba(") { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }
        let r = parts[0].parse::<u8>().ok()?;
        let g = parts[1].parse::<u8>().ok()?;
        let b = parts[2].parse::<u8>().ok()?;
        if expected == 4 {
            let alpha = parts[3].parse::<f32>().ok()?;
            if !(0.0..=1.0).contains(&alpha) {
                return None;
            }
        }
        return Some(Color::Rgb(r, g, b));
    }

    if s.is_empty() {
        return None;
    }
    Color::from_str(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_formats() {
        assert_eq!(parse_color("#3B1051"), Some(Color::Rgb(0x3b, 0x10, 0x51)));
        assert_eq!(
            parse_color("rgba(235, 206, 254, 0.9)"),
            Some(Color::Rgb(235, 206, 254))
        );
        assert_eq!(parse_color("rgb(1,2,3)"), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(parse_color("red"), Some(Color::Red));
        assert_eq!(parse_color("rgba(1, 2, 3)"), None);
        assert_eq!(parse_color("rgb(300, 0, 0)"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_default_table() {
        let table = StyleTable::default();
        let warning = table.get(Severity::Warning.into());
        assert_eq!(warning.fg, Some(Color::Rgb(0x41, 0x32, 0x07)));
        assert_eq!(warning.bg, Some(Color::Rgb(255, 193, 7)));
        assert_eq!(table.get(Classification::Unclassified), Style::default());
        assert_eq!(table.by_token("warning"), Some(warning));
        assert_eq!(table.by_token("unclassified"), Some(Style::default()));
        assert_eq!(table.by_token("fatal"), None);
    }

    #[test]
    fn test_invalid_color_is_config_error() {
        let mut settings = SeveritySettings::default();
        settings.info.background_color = "not-a-color".to_string();

        match StyleTable::from_settings(&settings) {
            Err(ConfigError::InvalidColor { key, field, .. }) => {
                assert_eq!(key, "info");
                assert_eq!(field, "background");
            }
            other => panic!("expected InvalidColor, got {:?}", other),
        }
    }
}
