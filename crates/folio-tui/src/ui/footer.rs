//! Footer
//!
//! Quit hint below the content, separated by a rule.

use folio_app::Content;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Padding, Paragraph, Widget},
};

const MARGIN_TOP: u16 = 2;
const PADDING_X: u16 = 2;

/// Rows taken by the footer: margin, rule and hint.
pub const HEIGHT: u16 = MARGIN_TOP + 2;

/// Render the footer.
pub fn render(content: &Content, area: Rect, buf: &mut Buffer) {
    let area = Rect {
        y: area.y.saturating_add(MARGIN_TOP),
        height: area.height.saturating_sub(MARGIN_TOP),
        ..area
    };
    let block = Block::new().borders(Borders::TOP).padding(Padding::horizontal(PADDING_X));
    Paragraph::new(content.footer()).block(block).render(area, buf);
}
