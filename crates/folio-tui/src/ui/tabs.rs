//! Tab row
//!
//! One bordered label per tab, the active one bold with its bottom edge open
//! onto the content, followed by a rule out to the page width.

use folio_app::App;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Widget},
};

use crate::Theme;

/// Rows taken by the tab row: top border, label, bottom border.
pub const HEIGHT: u16 = 3;

const LABEL_PADDING_X: u16 = 3;
const BORDER_WIDTH: u16 = 2;

/// Where a tab sits in the row.
#[derive(Debug, Clone, Copy)]
struct Position {
    first: bool,
    last: bool,
    active: bool,
    /// Rule continues to the right of this tab.
    joins_rule: bool,
}

/// Render the tab row.
pub fn render(app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let tabs = app.tabs();
    let last = tabs.len().saturating_sub(1);
    let right = area.right();
    let mut x = area.x;

    for (index, tab) in tabs.iter().enumerate() {
        let label = tab.label();
        let width = label_width(&label);
        let end = x.saturating_add(width);
        let position = Position {
            first: index == 0,
            last: index == last,
            active: index == app.active_tab(),
            joins_rule: end < right,
        };

        let rect = Rect::new(x, area.y, width, area.height).intersection(area);
        if !rect.is_empty() {
            Paragraph::new(Line::styled(label, theme.tab_label(position.active)))
                .block(tab_block(position, theme))
                .render(rect, buf);
        }
        x = end;
    }

    if x < right {
        let rule = Rect::new(x, area.y, right - x, area.height).intersection(area);
        Block::new().borders(Borders::BOTTOM).border_style(theme.tab_border()).render(rule, buf);
    }
}

fn label_width(label: &str) -> u16 {
    let text = u16::try_from(Span::raw(label).width()).unwrap_or(u16::MAX);
    text.saturating_add(2 * LABEL_PADDING_X).saturating_add(BORDER_WIDTH)
}

fn tab_block(position: Position, theme: &Theme) -> Block<'static> {
    let (mut bottom_left, horizontal_bottom, mut bottom_right) =
        if position.active { ("┘", " ", "└") } else { ("┴", "─", "┴") };

    if position.first {
        bottom_left = if position.active { "│" } else { "├" };
    }
    if position.last {
        bottom_right = match (position.active, position.joins_rule) {
            (true, true) => "└",
            (false, true) => "┴",
            (true, false) => "│",
            (false, false) => "┤",
        };
    }

    let set = border::Set { bottom_left, bottom_right, horizontal_bottom, ..border::ROUNDED };
    Block::bordered()
        .border_set(set)
        .border_style(theme.tab_border())
        .padding(Padding::horizontal(LABEL_PADDING_X))
}
