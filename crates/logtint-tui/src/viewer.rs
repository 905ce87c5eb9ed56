use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Color as CColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use ratatui::style::Color;

use logtint_types::ClassifiedLine;

use crate::style::StyleTable;

/// A read-only surface that renders classified lines.
///
/// Lines arrive already classified, filtered and in document order.
pub trait ViewerAdapter {
    fn render(&mut self, lines: &[ClassifiedLine], styles: &StyleTable) -> io::Result<()>;
}

/// Writes lines to a plain writer, colored with ANSI escapes
pub struct AnsiPrinter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> AnsiPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, color: true }
    }

    /// Disable colors (e.g. when writing to a file)
    pub fn plain(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ViewerAdapter for AnsiPrinter<W> {
    fn render(&mut self, lines: &[ClassifiedLine], styles: &StyleTable) -> io::Result<()> {
        for line in lines {
            if !self.color {
                writeln!(self.out, "{}", line.raw)?;
                continue;
            }

            let style = styles.get(line.classification);
            if let Some(fg) = style.fg {
                queue!(self.out, SetForegroundColor(to_crossterm(fg)))?;
            }
            if let Some(bg) = style.bg {
                queue!(self.out, SetBackgroundColor(to_crossterm(bg)))?;
            }
            queue!(self.out, Print(&line.raw), ResetColor, Print("\n"))?;
        }
        self.out.flush()
    }
}

/// Map a ratatui color to the crossterm color used for raw output
pub fn to_crossterm(color: Color) -> CColor {
    match color {
        Color::Reset => CColor::Reset,
        Color::Black => CColor::Black,
        Color::Red => CColor::DarkRed,
        Color::Green => CColor::DarkGreen,
        Color::Yellow => CColor::DarkYellow,
        Color::Blue => CColor::DarkBlue,
        Color::Magenta => CColor::DarkMagenta,
        Color::Cyan => CColor::DarkCyan,
        Color::Gray => CColor::Grey,
        Color::DarkGray => CColor::DarkGrey,
        Color::LightRed => CColor::Red,
        Color::LightGreen => CColor::Green,
        Color::LightYellow => CColor::Yellow,
        Color::LightBlue => CColor::Blue,
        Color::LightMagenta => CColor::Magenta,
        Color::LightCyan => CColor::Cyan,
        Color::White => CColor::White,
        Color::Rgb(r, g, b) => CColor::Rgb { r, g, b },
        Color::Indexed(i) => CColor::AnsiValue(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtint_types::{Classification, Severity};

    fn lines() -> Vec<ClassifiedLine> {
        vec![
            ClassifiedLine::new(1, "boot".into(), Classification::Unclassified),
            ClassifiedLine::new(2, "ERROR x".into(), Severity::Error.into()),
        ]
    }

    #[test]
    fn test_plain_output() {
        let mut printer = AnsiPrinter::new(Vec::new()).plain();
        printer.render(&lines(), &StyleTable::default()).unwrap();
        assert_eq!(String::from_utf8(printer.into_inner()).unwrap(), "boot\nERROR x\n");
    }

    #[test]
    fn test_colored_output_uses_severity_colors() {
        let mut printer = AnsiPrinter::new(Vec::new());
        printer.render(&lines(), &StyleTable::default()).unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();

        // error text color #64171E
        assert!(out.contains("\x1b[38;2;100;23;30m"));
        assert!(out.contains("ERROR x"));
        assert!(out.starts_with("boot"));
    }
}
