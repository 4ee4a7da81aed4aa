//! Immutable styling shared by every session.
//!
//! Built once at server start and passed by reference into rendering.

use folio_app::{BlockStyle, Tone};
use ratatui::style::{Color, Modifier, Style};

/// Colours and modifiers used by the portfolio view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Foreground for accented content (headings, the heart).
    pub accent: Color,
    /// Foreground for tab borders.
    pub highlight: Color,
}

impl Theme {
    /// Style for a content block.
    pub fn block(&self, style: BlockStyle) -> Style {
        let base = match style.tone {
            Tone::Default => Style::default(),
            Tone::Accent => Style::default().fg(self.accent),
        };
        if style.bold { base.add_modifier(Modifier::BOLD) } else { base }
    }

    /// Style for a tab label.
    pub fn tab_label(&self, active: bool) -> Style {
        if active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    }

    /// Style for tab borders and the line under the tab row.
    pub fn tab_border(&self) -> Style {
        Style::default().fg(self.highlight)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self { accent: Color::Red, highlight: Color::Rgb(0x87, 0x4B, 0xFD) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_is_bold_and_accented() {
        let theme = Theme::default();
        let style = theme.block(BlockStyle::HEADING);

        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn plain_block_has_no_attributes() {
        assert_eq!(Theme::default().block(BlockStyle::PLAIN), Style::default());
    }

    #[test]
    fn inactive_tab_is_dim() {
        let style = Theme::default().tab_label(false);
        assert!(style.add_modifier.contains(Modifier::DIM));
        assert!(!style.add_modifier.contains(Modifier::BOLD));
    }
}
