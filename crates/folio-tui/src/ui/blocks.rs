//! Content blocks
//!
//! One styled block of the active tab's text.

use folio_app::ContentBlock;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Padding, Paragraph, Widget},
};

use super::text_height;
use crate::Theme;

/// Rows taken by a block, including padding and its optional rule.
pub fn height(block: &ContentBlock) -> u16 {
    let rule = u16::from(block.style.border_bottom);
    text_height(block.text).saturating_add(2 * block.style.padding_y).saturating_add(rule)
}

/// Render one content block. Lines wider than the area are cut off.
pub fn render(block: &ContentBlock, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let style = block.style;
    let mut frame = Block::new().padding(Padding::new(
        style.padding_x,
        style.padding_x,
        style.padding_y,
        style.padding_y,
    ));
    if style.border_bottom {
        frame = frame.borders(Borders::BOTTOM);
    }

    Paragraph::new(block.text).style(theme.block(style)).block(frame).render(area, buf);
}

#[cfg(test)]
mod tests {
    use folio_app::BlockStyle;

    use super::*;

    #[test]
    fn height_counts_padding_and_rule() {
        let plain = ContentBlock { style: BlockStyle::PLAIN, text: "one\ntwo" };
        assert_eq!(height(&plain), 4);

        let ruled = ContentBlock { style: BlockStyle::PLAIN.border_bottom(), text: "one" };
        assert_eq!(height(&ruled), 4);
    }
}
