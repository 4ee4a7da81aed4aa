//! Banner
//!
//! ASCII-art name shown at the top of every page.

use folio_app::Content;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Text},
    widgets::{Block, Padding, Paragraph, Widget},
};

use super::text_width;

const PADDING_X: u16 = 2;
const PADDING_Y: u16 = 1;

/// Width of the banner including its padding.
pub fn width(content: &Content) -> u16 {
    text_width(content.banner().iter().copied()).saturating_add(2 * PADDING_X)
}

/// Rows taken by the banner including its padding.
pub fn height(content: &Content) -> u16 {
    u16::try_from(content.banner().len()).unwrap_or(u16::MAX).saturating_add(2 * PADDING_Y)
}

/// Render the banner.
pub fn render(content: &Content, area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line> = content.banner().iter().map(|line| Line::raw(*line)).collect();
    let block = Block::new().padding(Padding::new(PADDING_X, PADDING_X, PADDING_Y, PADDING_Y));
    Paragraph::new(Text::from(lines)).block(block).render(area, buf);
}
