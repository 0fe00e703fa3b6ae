//! Visual style of an accordion.

use ratatui::style::{Color, Modifier, Style};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionStyle {
    /// Drawn before the label of an open header
    pub open_symbol: String,
    /// Drawn before the label of a closed header
    pub closed_symbol: String,
    /// Columns per nesting level (None = align with header labels)
    pub indent: Option<u16>,
    pub header: Style,
    pub focused_header: Style,
    pub content: Style,
}

impl Default for AccordionStyle {
    fn default() -> Self {
        Self {
            open_symbol: "▼".to_string(),
            closed_symbol: "▶".to_string(),
            indent: None,
            header: Style::default().fg(Color::Gray),
            focused_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            content: Style::default(),
        }
    }
}

impl AccordionStyle {
    pub fn with_symbols(mut self, open: impl Into<String>, closed: impl Into<String>) -> Self {
        self.open_symbol = open.into();
        self.closed_symbol = closed.into();
        self
    }

    pub fn with_accent(mut self, color: Color) -> Self {
        self.focused_header = self.focused_header.fg(color);
        self
    }

    pub fn with_indent(mut self, indent: u16) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn symbol(&self, open: bool) -> &str {
        if open {
            &self.open_symbol
        } else {
            &self.closed_symbol
        }
    }

    /// Columns of indentation per nesting level.
    pub fn indent_width(&self) -> u16 {
        self.indent.unwrap_or_else(|| {
            let symbol = self.open_symbol.width().max(self.closed_symbol.width());
            (symbol + 1) as u16
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_indent_aligns_with_label() {
        let style = AccordionStyle::default();
        assert_eq!(style.indent_width(), 2);

        let wide = style.clone().with_symbols("[-]", "[+]");
        assert_eq!(wide.indent_width(), 4);

        assert_eq!(style.with_indent(6).indent_width(), 6);
    }

    #[test]
    fn test_symbol_by_state() {
        let style = AccordionStyle::default();
        assert_eq!(style.symbol(true), "▼");
        assert_eq!(style.symbol(false), "▶");
    }
}
